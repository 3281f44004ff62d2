//! Decoded record types.

use std::fmt;
use std::sync::Arc;

/// A decoded column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Integer(i64),
}

impl FieldValue {
    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The flag, if this is a boolean value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Flag(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// A raw line decoded against a schema.
///
/// Holds one entry per column that was paired with a schema field, in schema
/// order. Empty columns are present with no value. Fields beyond the last
/// column of a short line are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    fields: Vec<(Arc<str>, Option<FieldValue>)>,
    schema_len: usize,
}

impl ParsedRecord {
    pub(crate) fn new(fields: Vec<(Arc<str>, Option<FieldValue>)>, schema_len: usize) -> Self {
        Self { fields, schema_len }
    }

    /// The decoded value of `name`; `None` if the field is absent or its column was empty.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| &**key == name)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Whether `name` was paired with a column, empty or not.
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| &**key == name)
    }

    /// Field names in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| &**key)
    }

    /// (name, value) pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.fields
            .iter()
            .map(|(key, value)| (&**key, value.as_ref()))
    }

    /// Number of fields paired with a column.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the line had fewer columns than the schema has fields.
    pub fn is_short(&self) -> bool {
        self.fields.len() < self.schema_len
    }
}
