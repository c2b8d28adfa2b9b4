//! Database driver implementations.
//!
//! - [`mssql`]: Microsoft SQL Server dialect and executor
//!
//! Each driver provides a `Dialect` (SQL syntax) and a `TargetExecutor`
//! (statement execution). Dialects are selected by database type string
//! through [`DialectImpl::from_db_type`].

pub mod mssql;

pub use mssql::{MssqlDialect, MssqlExecutor};

use crate::config::UpsertStyle;
use crate::core::schema::Schema;
use crate::core::traits::Dialect;
use crate::error::{MigrateError, Result};

/// Enum-based static dispatch for dialects.
#[derive(Debug, Clone)]
pub enum DialectImpl {
    Mssql(MssqlDialect),
}

impl DialectImpl {
    /// Create a dialect implementation from a database type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the database type is not recognized.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        match db_type.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(DialectImpl::Mssql(MssqlDialect::new())),
            other => Err(MigrateError::Config(format!(
                "Unknown database type: '{}'. Supported types: mssql",
                other
            ))),
        }
    }
}

impl Dialect for DialectImpl {
    fn name(&self) -> &str {
        match self {
            DialectImpl::Mssql(d) => d.name(),
        }
    }

    fn param_placeholder(&self, index: usize) -> String {
        match self {
            DialectImpl::Mssql(d) => d.param_placeholder(index),
        }
    }

    fn build_create_table(&self, table: &str, schema: &Schema) -> String {
        match self {
            DialectImpl::Mssql(d) => d.build_create_table(table, schema),
        }
    }

    fn build_insert(&self, table: &str, columns: &[String]) -> String {
        match self {
            DialectImpl::Mssql(d) => d.build_insert(table, columns),
        }
    }

    fn build_upsert(
        &self,
        table: &str,
        columns: &[String],
        key_column: &str,
        style: UpsertStyle,
    ) -> String {
        match self {
            DialectImpl::Mssql(d) => d.build_upsert(table, columns, key_column, style),
        }
    }

    fn wrap_identity_insert(&self, table: &str, statement: &str) -> String {
        match self {
            DialectImpl::Mssql(d) => d.wrap_identity_insert(table, statement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_impl_from_db_type() {
        let mssql = DialectImpl::from_db_type("mssql").unwrap();
        assert_eq!(mssql.name(), "mssql");

        assert!(DialectImpl::from_db_type("SqlServer").is_ok());
        assert!(DialectImpl::from_db_type("sql_server").is_ok());
        assert!(DialectImpl::from_db_type("postgres").is_err());
    }

    #[test]
    fn test_dialect_impl_dispatch() {
        let dialect = DialectImpl::Mssql(MssqlDialect::new());
        assert_eq!(dialect.param_placeholder(2), "@P2");
        assert_eq!(
            dialect.build_insert("T", &["A".to_string()]),
            "INSERT INTO T (A) VALUES (@P1)"
        );
    }
}
