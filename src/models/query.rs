//! Query-related data models.
//!
//! This module defines the query request and the shape of result rows.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A SQL template plus its positional bind arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub sql: String,
    /// Bound as text, in order
    pub params: Vec<String>,
}

impl QuerySpec {
    /// Create a query without bind arguments.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Add a bind argument to this query.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }

    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Rows returned by one query execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Cursor column order; empty when no rows were returned
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A single column value decoded from the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Raw bytes; rendered as text when serialized
    Binary(Vec<u8>),
}

impl RowValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Serialize for RowValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(v) => serializer.serialize_i64(*v),
            // JSON has no NaN/Infinity
            Self::Float(v) if !v.is_finite() => serializer.serialize_str(&v.to_string()),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Boolean(v) => serializer.serialize_bool(*v),
            Self::Binary(bytes) => serializer.serialize_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

/// One result row: column name to value, in cursor column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    entries: Vec<(String, RowValue)>,
}

impl ResultRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a column value. A repeated column name replaces the earlier
    /// value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: RowValue) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&RowValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RowValue)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (String, RowValue)>>(iter: I) -> Self {
        let mut row = ResultRow::default();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for ResultRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (column, value) in &self.entries {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_spec_builder() {
        let spec = QuerySpec::new("SELECT ?, ?").with_param("a").with_param("b");
        assert_eq!(spec.params, vec!["a", "b"]);
        assert!(spec.has_params());
        assert!(!QuerySpec::new("SELECT 1").has_params());
    }

    #[test]
    fn test_binary_serializes_as_text() {
        let value = RowValue::Binary(b"hello".to_vec());
        assert_eq!(serde_json::to_string(&value).unwrap(), r#""hello""#);
    }

    #[test]
    fn test_invalid_utf8_binary_is_lossy() {
        let value = RowValue::Binary(vec![b'o', b'k', 0xFF]);
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"ok\u{FFFD}\"");
    }

    #[test]
    fn test_scalar_serialization() {
        assert!(RowValue::Null.is_null());
        assert_eq!(serde_json::to_string(&RowValue::Null).unwrap(), "null");
        assert_eq!(serde_json::to_string(&RowValue::Integer(-7)).unwrap(), "-7");
        assert_eq!(serde_json::to_string(&RowValue::Float(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&RowValue::Boolean(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&RowValue::Text("a\"b".into())).unwrap(),
            r#""a\"b""#
        );
    }

    #[test]
    fn test_non_finite_float_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&RowValue::Float(f64::NAN)).unwrap(),
            r#""NaN""#
        );
    }

    #[test]
    fn test_row_preserves_column_order() {
        let row: ResultRow = vec![
            ("z".to_string(), RowValue::Integer(1)),
            ("a".to_string(), RowValue::Null),
        ]
        .into_iter()
        .collect();
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"z":1,"a":null}"#);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_duplicate_column_last_value_wins() {
        let mut row = ResultRow::with_capacity(3);
        row.insert("a", RowValue::Integer(1));
        row.insert("b", RowValue::Integer(2));
        row.insert("a", RowValue::Integer(3));
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("a"), Some(&RowValue::Integer(3)));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"a":3,"b":2}"#);
    }
}
