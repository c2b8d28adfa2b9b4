//! # csv-mssql-migrate
//!
//! Load delimited text files into SQL Server tables.
//!
//! The first line of every file declares the destination table: each field
//! is `name$$TYPE`, e.g. `ID$$INT;Name$$VARCHAR(50)`. The library creates the
//! table from that header and writes every following line as one row:
//!
//! - **Insert mode**: one `INSERT` per record; an existing table aborts the file
//! - **Upsert mode**: insert-or-update keyed on the first column; an existing
//!   table is reused
//! - **Identity columns**: explicit key values are accepted for `IDENTITY` columns
//! - **Failure isolation**: bad paths, tables and records are reported and skipped
//!
//! ## Example
//!
//! ```rust,no_run
//! use csv_mssql_migrate::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> csv_mssql_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::connect(config)?;
//!     let report = orchestrator.run(&["data/customers.csv"], None).await;
//!     println!("Wrote {} records", report.totals.records_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod source;
pub mod writer;

// Re-exports for convenient access
pub use config::{Config, InputConfig, MigrationConfig, TargetConfig, UpsertStyle, WriteMode};
pub use crate::core::{Schema, SqlValue, TargetExecutor};
pub use error::{MigrateError, Result};
pub use orchestrator::{FileOutcome, FileReport, MigrationOutcome, MigrationReport, Orchestrator};
pub use source::{classify, InputKind};
