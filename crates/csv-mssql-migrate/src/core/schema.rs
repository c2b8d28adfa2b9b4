//! Header-derived table metadata.
//!
//! The first line of every input file encodes the destination table layout:
//! each field is `name<separator>typeClause` (separator `$$` by default), for
//! example `ID$$INT;Name$$VARCHAR(50)`. The column order is positional and
//! must match the field order of every data line.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One destination column, taken verbatim from a header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,

    /// Raw SQL type and constraint text (e.g. "INT", "VARCHAR(50) NOT NULL").
    /// Empty when the header field carried no separator.
    pub type_clause: String,
}

impl ColumnSpec {
    /// Split a header field on the first occurrence of `separator`.
    ///
    /// A field without the separator becomes a column with an empty type clause.
    pub fn parse(field: &str, separator: &str) -> Self {
        match field.split_once(separator) {
            Some((name, type_clause)) => Self {
                name: name.to_string(),
                type_clause: type_clause.to_string(),
            },
            None => Self {
                name: field.to_string(),
                type_clause: String::new(),
            },
        }
    }

    /// Column definition as it appears inside `CREATE TABLE (...)`.
    pub fn definition(&self) -> String {
        if self.type_clause.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.type_clause)
        }
    }

    /// Whether the type clause declares an identity (auto-generated) column.
    pub fn is_identity(&self) -> bool {
        self.type_clause.to_uppercase().contains("IDENTITY")
    }
}

/// Ordered column list for one table. Immutable once derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    /// Derive a schema from the already-split header fields.
    pub fn from_header<S: AsRef<str>>(fields: &[S], separator: &str) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|f| ColumnSpec::parse(f.as_ref(), separator))
                .collect(),
        }
    }

    /// Columns in header order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// The first column, used as the match key for upserts.
    ///
    /// Callers must guarantee its values are unique; duplicate keys make the
    /// upsert predicate match several rows.
    pub fn key_column(&self) -> Option<&ColumnSpec> {
        self.columns.first()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if the header produced no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True if any column is declared as an identity column.
    pub fn has_identity(&self) -> bool {
        self.columns.iter().any(ColumnSpec::is_identity)
    }
}

/// Derive the destination table name from an input file path.
///
/// Takes the final path segment, drops everything from the first `.` and
/// upper-cases the rest: `data/customers.csv` becomes `CUSTOMERS`.
pub fn table_name_for(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file_name
        .split('.')
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_and_type() {
        let col = ColumnSpec::parse("ID$$INT", "$$");
        assert_eq!(col.name, "ID");
        assert_eq!(col.type_clause, "INT");
        assert_eq!(col.definition(), "ID INT");
    }

    #[test]
    fn test_parse_without_separator() {
        let col = ColumnSpec::parse("Name", "$$");
        assert_eq!(col.name, "Name");
        assert_eq!(col.type_clause, "");
        assert_eq!(col.definition(), "Name");
    }

    #[test]
    fn test_parse_splits_on_first_separator_only() {
        let col = ColumnSpec::parse("Note$$VARCHAR(10)$$x", "$$");
        assert_eq!(col.name, "Note");
        assert_eq!(col.type_clause, "VARCHAR(10)$$x");
    }

    #[test]
    fn test_parse_keeps_text_verbatim() {
        let col = ColumnSpec::parse("Town$$VARCHAR(50) NOT NULL", "$$");
        assert_eq!(col.type_clause, "VARCHAR(50) NOT NULL");
    }

    #[test]
    fn test_identity_detection() {
        assert!(ColumnSpec::parse("ID$$INT IDENTITY(1,1) PRIMARY KEY", "$$").is_identity());
        assert!(ColumnSpec::parse("ID$$int identity", "$$").is_identity());
        assert!(!ColumnSpec::parse("ID$$INT", "$$").is_identity());
    }

    #[test]
    fn test_schema_from_header() {
        let schema = Schema::from_header(
            &["ID$$INT", "Name$$VARCHAR(50)", "Town$$VARCHAR(50)"],
            "$$",
        );
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.column_names(), vec!["ID", "Name", "Town"]);
        assert_eq!(schema.key_column().unwrap().name, "ID");
        assert!(!schema.has_identity());
    }

    #[test]
    fn test_schema_custom_separator() {
        let schema = Schema::from_header(&["ID::INT"], "::");
        assert_eq!(schema.columns()[0].type_clause, "INT");
    }

    #[test]
    fn test_table_name_for() {
        assert_eq!(table_name_for(Path::new("customers.csv")), "CUSTOMERS");
        assert_eq!(table_name_for(Path::new("data/in/Orders.CSV")), "ORDERS");
        assert_eq!(table_name_for(Path::new("/tmp/sales.2024.csv")), "SALES");
        assert_eq!(table_name_for(Path::new("noext")), "NOEXT");
    }
}
