//! Materialized result rows.

use std::ops::Index;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::Value;

/// A single result row: an ordered mapping from column name to value.
///
/// Column order is exactly the order the backend returned. Values are
/// the raw driver values with no coercion beyond what the driver itself
/// performs. Records carry no identity — two reads of the same row
/// produce two independent records.
///
/// Serializes as a JSON-style map, preserving column order.
///
/// # Examples
///
/// ```
/// use craftdb_core::{Record, Value};
///
/// let mut row = Record::new();
/// row.push("id", Value::Integer(1));
/// row.push("name", Value::from("Ann"));
///
/// assert_eq!(row["name"].as_text(), Some("Ann"));
/// assert_eq!(row.get("missing"), None);
/// assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column without checking for duplicates.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    /// Replaces the value of `column`, or appends it if absent.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Returns the value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Returns `true` if `column` is present.
    pub fn contains(&self, column: &str) -> bool {
        self.fields.iter().any(|(c, _)| c == column)
    }

    /// Iterates column names in backend order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    /// Iterates `(column, value)` pairs in backend order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Index<&str> for Record {
    type Output = Value;

    /// Panics if `column` is absent; use [`Record::get`] for a fallible
    /// lookup.
    fn index(&self, column: &str) -> &Value {
        self.get(column)
            .unwrap_or_else(|| panic!("no column '{column}' in record"))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
