//! Type definitions for the database gateway

use serde::{Serialize, Serializer};
use std::fmt;

// ============================================================================
// Catalog Types
// ============================================================================

/// One column of a table, as reported by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// A foreign-key reference from one column to another table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDescriptor {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Structure of a table at the moment it was read
///
/// An empty `columns` list means the table does not exist (or has no
/// columns); callers have to check for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

impl TableSchema {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ============================================================================
// Query Result Types
// ============================================================================

/// A single value returned by the store
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Binary payload, rendered by size only
    Opaque(Vec<u8>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl From<rusqlite::types::Value> for ScalarValue {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value;
        match value {
            Value::Null => ScalarValue::Null,
            Value::Integer(i) => ScalarValue::Integer(i),
            Value::Real(f) => ScalarValue::Real(f),
            Value::Text(s) => ScalarValue::Text(s),
            Value::Blob(b) => ScalarValue::Opaque(b),
        }
    }
}

/// Text form used by the tabular renderer; nulls are handled by the caller
impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => Ok(()),
            ScalarValue::Integer(i) => write!(f, "{}", i),
            ScalarValue::Real(r) => write!(f, "{:?}", r),
            ScalarValue::Text(s) => f.write_str(s),
            ScalarValue::Opaque(b) => write!(f, "<blob {} bytes>", b.len()),
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScalarValue::Null => serializer.serialize_none(),
            ScalarValue::Integer(i) => serializer.serialize_i64(*i),
            ScalarValue::Real(r) => serializer.serialize_f64(*r),
            ScalarValue::Text(s) => serializer.serialize_str(s),
            ScalarValue::Opaque(b) => {
                serializer.serialize_str(&format!("<blob {} bytes>", b.len()))
            }
        }
    }
}

/// One result row: column name to value, in store column order
///
/// Column names are unique within a row. When a query produces the same
/// name twice, the first position is kept and the later value wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResultRow {
    fields: Vec<(String, ScalarValue)>,
}

impl QueryResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `column`
    pub fn insert(&mut self, column: impl Into<String>, value: ScalarValue) {
        let column = column.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ScalarValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ScalarValue)> for QueryResultRow {
    fn from_iter<I: IntoIterator<Item = (S, ScalarValue)>>(iter: I) -> Self {
        let mut row = QueryResultRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}
