//! Record write strategy.
//!
//! A [`StatementBuilder`] is prepared once per file from the table name and
//! header schema. It renders the `CREATE TABLE` statement and a single
//! parameterized write statement (INSERT or UPSERT), then binds each record
//! to that statement positionally.

use tracing::debug;

use crate::config::{MigrationConfig, UpsertStyle, WriteMode};
use crate::core::schema::Schema;
use crate::core::traits::Dialect;
use crate::core::value::{bind_record, SqlValue};
use crate::error::Result;

/// How records are written into the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Plain INSERT per record.
    Insert,

    /// Insert new keys and update existing ones, keyed on the first column.
    Upsert(UpsertStyle),
}

impl WriteStrategy {
    /// Select the strategy from migration settings.
    pub fn from_config(config: &MigrationConfig) -> Self {
        match config.mode {
            WriteMode::Insert => WriteStrategy::Insert,
            WriteMode::Upsert => WriteStrategy::Upsert(config.upsert_style),
        }
    }

    pub fn is_upsert(&self) -> bool {
        matches!(self, WriteStrategy::Upsert(_))
    }
}

/// A statement ready for execution: SQL text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteStatement<'a> {
    pub sql: &'a str,
    pub params: Vec<SqlValue<'a>>,
}

/// Renders and binds the statements for one destination table.
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    table: String,
    schema: Schema,
    strategy: WriteStrategy,
    create_sql: String,
    write_sql: String,
}

impl StatementBuilder {
    /// Prepare the statements for `table` using `dialect`.
    pub fn new(
        dialect: &dyn Dialect,
        table: impl Into<String>,
        schema: Schema,
        strategy: WriteStrategy,
    ) -> Self {
        let table = table.into();
        let columns = schema.column_names();
        let key_column = schema
            .key_column()
            .map(|c| c.name.as_str())
            .unwrap_or_default();

        let create_sql = dialect.build_create_table(&table, &schema);

        let mut write_sql = match strategy {
            WriteStrategy::Insert => dialect.build_insert(&table, &columns),
            WriteStrategy::Upsert(style) => {
                dialect.build_upsert(&table, &columns, key_column, style)
            }
        };

        if schema.has_identity() {
            write_sql = dialect.wrap_identity_insert(&table, &write_sql);
        }

        debug!("{}: write statement prepared ({:?})", table, strategy);

        Self {
            table,
            schema,
            strategy,
            create_sql,
            write_sql,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn strategy(&self) -> WriteStrategy {
        self.strategy
    }

    /// `CREATE TABLE` statement for the schema.
    pub fn create_table_sql(&self) -> &str {
        &self.create_sql
    }

    /// The parameterized write statement shared by every record.
    pub fn write_sql(&self) -> &str {
        &self.write_sql
    }

    /// Bind one record's fields to the write statement.
    ///
    /// Empty fields bind as NULL. A record whose field count differs from
    /// the column count is rejected.
    pub fn bind<'a, S: AsRef<str>>(&'a self, fields: &'a [S]) -> Result<WriteStatement<'a>> {
        let params = bind_record(&self.schema, fields)?;
        Ok(WriteStatement {
            sql: &self.write_sql,
            params,
        })
    }
}
