//! Core traits for database-agnostic loading.
//!
//! - [`TargetExecutor`]: Runs SQL text against the destination database
//! - [`Dialect`]: SQL syntax strategy for the destination engine

use async_trait::async_trait;

use crate::config::UpsertStyle;
use crate::error::Result;

use super::schema::Schema;
use super::value::SqlValue;

/// Execute statements against the destination database.
///
/// Each call is a complete unit: a connection is acquired, the statement is
/// run, and the connection is released. The engine never has two calls in
/// flight at once.
#[async_trait]
pub trait TargetExecutor: Send + Sync {
    /// Run a DDL statement without parameters.
    async fn execute_ddl(&self, sql: &str) -> Result<()>;

    /// Run a DML statement with positionally bound parameters.
    ///
    /// Returns the number of rows affected.
    async fn execute(&self, sql: &str, params: &[SqlValue<'_>]) -> Result<u64>;

    /// Get the database type identifier (e.g., "mssql").
    fn db_type(&self) -> &str;
}

/// SQL syntax strategy for the destination engine.
///
/// Table names, column names and type clauses are emitted exactly as they
/// appear in the input; only values are parameterized.
pub trait Dialect: Send + Sync {
    /// Get the dialect identifier (e.g., "mssql").
    fn name(&self) -> &str;

    /// Get a parameter placeholder for the given 1-based index.
    fn param_placeholder(&self, index: usize) -> String;

    /// Build `CREATE TABLE` from a header-derived schema.
    fn build_create_table(&self, table: &str, schema: &Schema) -> String;

    /// Build a single-row INSERT with one placeholder per column.
    fn build_insert(&self, table: &str, columns: &[String]) -> String;

    /// Build a single-row insert-or-update keyed on `key_column`.
    ///
    /// Every placeholder refers to the same positional parameter list as
    /// [`build_insert`](Dialect::build_insert), so one binding serves both
    /// branches.
    fn build_upsert(
        &self,
        table: &str,
        columns: &[String],
        key_column: &str,
        style: UpsertStyle,
    ) -> String;

    /// Allow explicit values for the table's identity column for the
    /// duration of `statement`.
    fn wrap_identity_insert(&self, table: &str, statement: &str) -> String;
}
