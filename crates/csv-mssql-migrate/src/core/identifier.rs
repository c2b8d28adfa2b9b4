//! Identifier and type clause inspection.
//!
//! Table names, column names and type clauses come straight from file names
//! and header lines and are spliced into DDL/DML text unchanged (identifiers
//! and types cannot be parameterized). This module does not rewrite them.
//! It reports suspicious text so the caller can warn the operator while
//! still emitting identical SQL for well-formed headers.

use std::fmt;

use serde::Serialize;

use super::schema::Schema;

/// Maximum identifier length accepted by SQL Server.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Something unusual found in a name or type clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierIssue {
    /// The offending text as it appears in the input.
    pub subject: String,

    /// What is wrong with it.
    pub kind: IssueKind,
}

/// Category of an [`IdentifierIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Empty name.
    Empty,
    /// Contains a NUL byte.
    NullByte,
    /// Longer than SQL Server allows.
    TooLong,
    /// Contains a statement separator.
    StatementSeparator,
    /// Contains a comment marker.
    CommentMarker,
    /// Header field had no type clause, so the column definition is incomplete.
    MissingType,
}

impl fmt::Display for IdentifierIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            IssueKind::Empty => "is empty",
            IssueKind::NullByte => "contains a NUL byte",
            IssueKind::TooLong => "exceeds 128 characters",
            IssueKind::StatementSeparator => "contains ';'",
            IssueKind::CommentMarker => "contains a SQL comment marker",
            IssueKind::MissingType => "has no type clause",
        };
        write!(f, "{:?} {}", self.subject, what)
    }
}

fn issue(subject: &str, kind: IssueKind) -> IdentifierIssue {
    IdentifierIssue {
        subject: subject.to_string(),
        kind,
    }
}

fn inspect_text(text: &str, issues: &mut Vec<IdentifierIssue>) {
    if text.contains('\0') {
        issues.push(issue(text, IssueKind::NullByte));
    }
    if text.contains(';') {
        issues.push(issue(text, IssueKind::StatementSeparator));
    }
    if text.contains("--") || text.contains("/*") || text.contains("*/") {
        issues.push(issue(text, IssueKind::CommentMarker));
    }
}

/// Inspect a table or column name.
pub fn inspect_identifier(name: &str) -> Vec<IdentifierIssue> {
    let mut issues = Vec::new();
    if name.is_empty() {
        issues.push(issue(name, IssueKind::Empty));
        return issues;
    }
    if name.chars().count() > MAX_IDENTIFIER_LENGTH {
        issues.push(issue(name, IssueKind::TooLong));
    }
    inspect_text(name, &mut issues);
    issues
}

/// Inspect a column type clause.
pub fn inspect_type_clause(column: &str, type_clause: &str) -> Vec<IdentifierIssue> {
    let mut issues = Vec::new();
    if type_clause.trim().is_empty() {
        issues.push(issue(column, IssueKind::MissingType));
        return issues;
    }
    inspect_text(type_clause, &mut issues);
    issues
}

/// Inspect a table name together with every column of its schema.
pub fn inspect_table(table: &str, schema: &Schema) -> Vec<IdentifierIssue> {
    let mut issues = inspect_identifier(table);
    for col in schema.columns() {
        issues.extend(inspect_identifier(&col.name));
        issues.extend(inspect_type_clause(&col.name, &col.type_clause));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_names_pass() {
        assert!(inspect_identifier("CUSTOMERS").is_empty());
        assert!(inspect_identifier("first_name").is_empty());
        assert!(inspect_type_clause("Name", "VARCHAR(50) NOT NULL").is_empty());
    }

    #[test]
    fn test_empty_and_long_names() {
        assert_eq!(inspect_identifier("")[0].kind, IssueKind::Empty);
        let long = "x".repeat(129);
        assert_eq!(inspect_identifier(&long)[0].kind, IssueKind::TooLong);
        assert!(inspect_identifier(&"x".repeat(128)).is_empty());
    }

    #[test]
    fn test_injection_markers_flagged() {
        let issues = inspect_type_clause("ID", "INT); DROP TABLE X --");
        let kinds: Vec<_> = issues.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&IssueKind::StatementSeparator));
        assert!(kinds.contains(&IssueKind::CommentMarker));

        assert_eq!(
            inspect_identifier("a\0b")[0].kind,
            IssueKind::NullByte
        );
    }

    #[test]
    fn test_missing_type_flagged() {
        let issues = inspect_type_clause("Name", "");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingType);
        assert_eq!(issues[0].to_string(), "\"Name\" has no type clause");
    }

    #[test]
    fn test_inspect_table() {
        let schema = Schema::from_header(&["ID$$INT", "Name"], "$$");
        let issues = inspect_table("CUSTOMERS", &schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].subject, "Name");
    }
}
