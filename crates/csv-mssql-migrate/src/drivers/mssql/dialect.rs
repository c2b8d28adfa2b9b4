//! MSSQL SQL dialect (Strategy pattern).
//!
//! Provides SQL Server syntax for table creation, single-row inserts and
//! single-row upserts with positional `@P` parameters.

use crate::config::UpsertStyle;
use crate::core::schema::Schema;
use crate::core::traits::Dialect;

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }

    fn placeholders(&self, count: usize) -> Vec<String> {
        (1..=count).map(|i| self.param_placeholder(i)).collect()
    }

    fn build_conditional_upsert(&self, table: &str, columns: &[String], key_idx: usize) -> String {
        let params = self.placeholders(columns.len());
        let key_predicate = format!("{}={}", columns[key_idx], params[key_idx]);

        let mut sql = format!(
            "IF NOT EXISTS (SELECT * FROM {} WHERE {}) {}",
            table,
            key_predicate,
            self.build_insert(table, columns)
        );

        let assignments: Vec<String> = columns
            .iter()
            .zip(&params)
            .enumerate()
            .filter(|(i, _)| *i != key_idx)
            .map(|(_, (col, param))| format!("{}={}", col, param))
            .collect();

        // Nothing to update when the key is the only column
        if !assignments.is_empty() {
            sql.push_str(&format!(
                " ELSE UPDATE {} SET {} WHERE {}",
                table,
                assignments.join(", "),
                key_predicate
            ));
        }

        sql
    }

    fn build_merge_upsert(&self, table: &str, columns: &[String], key_idx: usize) -> String {
        let params = self.placeholders(columns.len());
        let key = &columns[key_idx];

        let source_cols: Vec<String> = columns
            .iter()
            .zip(&params)
            .map(|(col, param)| format!("{} AS {}", param, col))
            .collect();

        let update_cols: Vec<String> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_idx)
            .map(|(_, col)| format!("{} = source.{}", col, col))
            .collect();

        let insert_vals: Vec<String> = columns.iter().map(|c| format!("source.{}", c)).collect();

        let mut sql = format!(
            "MERGE INTO {} AS target USING (SELECT {}) AS source ON target.{} = source.{}",
            table,
            source_cols.join(", "),
            key,
            key
        );

        if !update_cols.is_empty() {
            sql.push_str(&format!(
                " WHEN MATCHED THEN UPDATE SET {}",
                update_cols.join(", ")
            ));
        }

        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({});",
            columns.join(", "),
            insert_vals.join(", ")
        ));

        sql
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn param_placeholder(&self, index: usize) -> String {
        // MSSQL uses @P1, @P2, etc. (1-based)
        format!("@P{}", index)
    }

    fn build_create_table(&self, table: &str, schema: &Schema) -> String {
        let col_defs: Vec<String> = schema.columns().iter().map(|c| c.definition()).collect();
        format!("CREATE TABLE {} ({})", table, col_defs.join(", "))
    }

    fn build_insert(&self, table: &str, columns: &[String]) -> String {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            self.placeholders(columns.len()).join(", ")
        )
    }

    fn build_upsert(
        &self,
        table: &str,
        columns: &[String],
        key_column: &str,
        style: UpsertStyle,
    ) -> String {
        let key_idx = columns.iter().position(|c| c == key_column).unwrap_or(0);
        match style {
            UpsertStyle::Conditional => self.build_conditional_upsert(table, columns, key_idx),
            UpsertStyle::Merge => self.build_merge_upsert(table, columns, key_idx),
        }
    }

    fn wrap_identity_insert(&self, table: &str, statement: &str) -> String {
        // Switch IDENTITY_INSERT back off even when the statement fails, so the
        // pooled session is not left with the setting on.
        let statement = statement.trim_end_matches(';');
        format!(
            "SET IDENTITY_INSERT {0} ON; BEGIN TRY {1}; END TRY BEGIN CATCH SET IDENTITY_INSERT {0} OFF; THROW; END CATCH; SET IDENTITY_INSERT {0} OFF;",
            table, statement
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_param_placeholder() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.param_placeholder(1), "@P1");
        assert_eq!(dialect.param_placeholder(10), "@P10");
    }

    #[test]
    fn test_build_create_table() {
        let dialect = MssqlDialect::new();
        let schema = Schema::from_header(
            &["ID$$INT", "Name$$VARCHAR(50)", "Town$$VARCHAR(50)"],
            "$$",
        );
        assert_eq!(
            dialect.build_create_table("CUSTOMERS", &schema),
            "CREATE TABLE CUSTOMERS (ID INT, Name VARCHAR(50), Town VARCHAR(50))"
        );
    }

    #[test]
    fn test_build_create_table_keeps_malformed_columns() {
        let dialect = MssqlDialect::new();
        let schema = Schema::from_header(&["ID$$INT", "Name"], "$$");
        assert_eq!(
            dialect.build_create_table("T", &schema),
            "CREATE TABLE T (ID INT, Name)"
        );
    }

    #[test]
    fn test_build_insert() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_insert("CUSTOMERS", &cols(&["ID", "Name", "Town"]));
        assert_eq!(
            sql,
            "INSERT INTO CUSTOMERS (ID, Name, Town) VALUES (@P1, @P2, @P3)"
        );
    }

    #[test]
    fn test_build_conditional_upsert() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_upsert(
            "CUSTOMERS",
            &cols(&["ID", "Name", "Town"]),
            "ID",
            UpsertStyle::Conditional,
        );
        assert_eq!(
            sql,
            "IF NOT EXISTS (SELECT * FROM CUSTOMERS WHERE ID=@P1) \
             INSERT INTO CUSTOMERS (ID, Name, Town) VALUES (@P1, @P2, @P3) \
             ELSE UPDATE CUSTOMERS SET Name=@P2, Town=@P3 WHERE ID=@P1"
        );
    }

    #[test]
    fn test_conditional_upsert_key_only() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_upsert("IDS", &cols(&["ID"]), "ID", UpsertStyle::Conditional);
        assert_eq!(
            sql,
            "IF NOT EXISTS (SELECT * FROM IDS WHERE ID=@P1) INSERT INTO IDS (ID) VALUES (@P1)"
        );
        assert!(!sql.contains("ELSE"));
    }

    #[test]
    fn test_build_merge_upsert() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_upsert(
            "CUSTOMERS",
            &cols(&["ID", "Name", "Town"]),
            "ID",
            UpsertStyle::Merge,
        );

        assert!(sql.starts_with("MERGE INTO CUSTOMERS AS target"));
        assert!(sql.contains("USING (SELECT @P1 AS ID, @P2 AS Name, @P3 AS Town) AS source"));
        assert!(sql.contains("ON target.ID = source.ID"));
        assert!(sql.contains("WHEN MATCHED THEN UPDATE SET Name = source.Name, Town = source.Town"));
        assert!(sql.contains(
            "WHEN NOT MATCHED THEN INSERT (ID, Name, Town) VALUES (source.ID, source.Name, source.Town)"
        ));
        assert!(sql.ends_with(';'));
    }

    #[test]
    fn test_merge_upsert_key_only() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_upsert("IDS", &cols(&["ID"]), "ID", UpsertStyle::Merge);
        assert!(!sql.contains("WHEN MATCHED"));
        assert!(sql.contains("WHEN NOT MATCHED THEN INSERT"));
    }

    #[test]
    fn test_upsert_key_is_never_assigned() {
        let dialect = MssqlDialect::new();
        let sql = dialect.build_upsert(
            "T",
            &cols(&["K", "A", "B"]),
            "K",
            UpsertStyle::Conditional,
        );
        let update = sql.split(" ELSE ").nth(1).unwrap();
        let set_list = update.split(" WHERE ").next().unwrap();
        assert!(!set_list.contains("K="));
        assert!(update.ends_with("WHERE K=@P1"));
    }

    #[test]
    fn test_wrap_identity_insert() {
        let dialect = MssqlDialect::new();
        let sql = dialect.wrap_identity_insert("T", "INSERT INTO T (ID) VALUES (@P1)");
        assert!(sql.starts_with("SET IDENTITY_INSERT T ON;"));
        assert!(sql.contains("BEGIN TRY INSERT INTO T (ID) VALUES (@P1); END TRY"));
        assert!(sql.ends_with("SET IDENTITY_INSERT T OFF;"));

        let merged = dialect.wrap_identity_insert("T", "MERGE INTO T AS target ...;");
        assert!(!merged.contains(";;"));
    }
}
