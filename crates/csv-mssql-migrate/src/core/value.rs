//! SQL parameter values and positional record binding.

use std::borrow::Cow;

use super::schema::Schema;
use crate::error::{MigrateError, Result};

/// A bound statement parameter.
///
/// Fields are never type-coerced on the client; text is sent as-is and the
/// server converts it to the column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue<'a> {
    /// SQL NULL.
    Null,

    /// Text data with zero-copy support.
    Text(Cow<'a, str>),
}

impl<'a> SqlValue<'a> {
    /// Normalize a raw field: the empty string binds as NULL.
    pub fn from_field(field: &'a str) -> Self {
        if field.is_empty() {
            SqlValue::Null
        } else {
            SqlValue::Text(Cow::Borrowed(field))
        }
    }

    /// Convert to a fully owned value with `'static` lifetime.
    #[must_use]
    pub fn into_owned(self) -> SqlValue<'static> {
        match self {
            SqlValue::Null => SqlValue::Null,
            SqlValue::Text(v) => SqlValue::Text(Cow::Owned(v.into_owned())),
        }
    }

    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Text content, if not NULL.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Null => None,
            SqlValue::Text(v) => Some(v),
        }
    }
}

impl From<String> for SqlValue<'static> {
    fn from(v: String) -> Self {
        SqlValue::Text(Cow::Owned(v))
    }
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(v: &'a str) -> Self {
        SqlValue::Text(Cow::Borrowed(v))
    }
}

/// Bind the fields of one record to the schema's columns by position.
///
/// Returns one value per column. A record whose field count differs from the
/// column count is rejected before any statement is sent.
pub fn bind_record<'a, S: AsRef<str>>(schema: &Schema, fields: &'a [S]) -> Result<Vec<SqlValue<'a>>> {
    if fields.len() != schema.len() {
        return Err(MigrateError::FieldCountMismatch {
            expected: schema.len(),
            actual: fields.len(),
        });
    }
    Ok(fields
        .iter()
        .map(|f| SqlValue::from_field(f.as_ref()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::from_header(&["ID$$INT", "Name$$VARCHAR(50)", "Town$$VARCHAR(50)"], "$$")
    }

    #[test]
    fn test_empty_field_is_null() {
        assert!(SqlValue::from_field("").is_null());
        assert_eq!(SqlValue::from_field(" "), SqlValue::Text(Cow::Borrowed(" ")));
        assert_eq!(SqlValue::from_field("NULL").as_str(), Some("NULL"));
    }

    #[test]
    fn test_bind_record_positional() {
        let fields = vec!["2".to_string(), "".to_string(), "Hamburg".to_string()];
        let values = bind_record(&schema(), &fields).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].as_str(), Some("2"));
        assert!(values[1].is_null());
        assert_eq!(values[2].as_str(), Some("Hamburg"));
    }

    #[test]
    fn test_bind_record_field_count_mismatch() {
        let short = vec!["1", "Alice"];
        let err = bind_record(&schema(), &short).unwrap_err();
        assert!(matches!(
            err,
            MigrateError::FieldCountMismatch {
                expected: 3,
                actual: 2
            }
        ));

        let long = vec!["1", "Alice", "Berlin", "extra"];
        assert!(bind_record(&schema(), &long).is_err());
    }

    #[test]
    fn test_sql_value_into_owned() {
        let borrowed: SqlValue<'_> = SqlValue::Text(Cow::Borrowed("hello"));
        let owned: SqlValue<'static> = borrowed.into_owned();
        assert_eq!(owned, SqlValue::Text(Cow::Owned("hello".to_string())));
    }
}
