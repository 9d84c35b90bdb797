//! Name-addressed result rows.

use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::value::Value;

/// One row of a query result, addressed by column name.
///
/// Columns keep the order the store returned them in; lookups take the
/// first column with a matching name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Builder-style, used mostly by adapters and tests.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Raw access to a column value, if the column exists.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, value)| value)
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| StoreError::MissingColumn(name.to_string()))
    }

    fn mismatch(name: &str, expected: &'static str) -> StoreError {
        StoreError::TypeMismatch {
            column: name.to_string(),
            expected,
        }
    }

    /// Read a non-null text column.
    pub fn text(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            Value::Text(s) => Ok(s),
            _ => Err(Self::mismatch(name, "text")),
        }
    }

    /// Read a nullable text column.
    pub fn opt_text(&self, name: &str) -> Result<Option<String>> {
        match self.require(name)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            _ => Err(Self::mismatch(name, "text")),
        }
    }

    /// Read a non-null integer column.
    pub fn integer(&self, name: &str) -> Result<i64> {
        match self.require(name)? {
            Value::Integer(v) => Ok(*v),
            _ => Err(Self::mismatch(name, "integer")),
        }
    }

    /// Read a non-null timestamp column.
    pub fn timestamp(&self, name: &str) -> Result<DateTime<Utc>> {
        match self.require(name)? {
            Value::Timestamp(ts) => Ok(*ts),
            _ => Err(Self::mismatch(name, "timestamp")),
        }
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
