//! Core abstractions for the migration engine.
//!
//! - [`schema`]: Header-derived column and table metadata
//! - [`value`]: Parameter values and positional record binding
//! - [`identifier`]: Inspection of names and type clauses spliced into SQL
//! - [`traits`]: The executor boundary and the SQL dialect strategy

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use identifier::{IdentifierIssue, IssueKind};
pub use schema::{table_name_for, ColumnSpec, Schema};
pub use traits::{Dialect, TargetExecutor};
pub use value::{bind_record, SqlValue};
