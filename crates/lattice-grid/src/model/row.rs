//! Row access and identity.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::value::CellValue;

/// Direct field lookup on an opaque row record.
///
/// Columns without a value getter read their value through this trait.
/// Implemented for JSON objects and string-keyed maps; application types
/// implement it to expose their fields by name.
pub trait GridRow: Send + Sync + 'static {
    /// Returns the value stored under `field`, or [`CellValue::Null`] if absent.
    fn field(&self, field: &str) -> CellValue;
}

impl GridRow for serde_json::Value {
    fn field(&self, field: &str) -> CellValue {
        self.get(field).map(CellValue::from).unwrap_or_default()
    }
}

impl GridRow for HashMap<String, CellValue> {
    fn field(&self, field: &str) -> CellValue {
        self.get(field).cloned().unwrap_or_default()
    }
}

impl GridRow for BTreeMap<String, CellValue> {
    fn field(&self, field: &str) -> CellValue {
        self.get(field).cloned().unwrap_or_default()
    }
}

/// Identity of a row, used for selection and keying.
///
/// Ids compare by value: `RowId::from(1)` equals another `RowId::from(1)`,
/// but never `RowId::from("1")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    /// Integer identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl RowId {
    /// Builds a row id from a cell value.
    ///
    /// Integral numbers become [`RowId::Int`]; everything else uses its string
    /// coercion. Returns `None` for null values.
    pub fn from_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Null => None,
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(RowId::Int(*n as i64)),
            other => Some(RowId::Str(other.to_display_string())),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{n}"),
            RowId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId::Int(value)
    }
}

impl From<i32> for RowId {
    fn from(value: i32) -> Self {
        RowId::Int(value as i64)
    }
}

impl From<u32> for RowId {
    fn from(value: u32) -> Self {
        RowId::Int(value as i64)
    }
}

impl From<usize> for RowId {
    fn from(value: usize) -> Self {
        RowId::Int(value as i64)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId::Str(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        RowId::Str(value)
    }
}

/// Computes a row's identity from the row and its index in the row collection.
pub type RowIdGetter<R> = Arc<dyn Fn(&R, usize) -> RowId + Send + Sync>;

/// Default row identity: the row's `id` field, falling back to its index.
pub fn default_row_id<R: GridRow>(row: &R, index: usize) -> RowId {
    RowId::from_value(&row.field("id")).unwrap_or(RowId::Int(index as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_field_lookup() {
        let row = json!({ "id": 1, "name": "Jon", "age": null });

        assert_eq!(row.field("name"), CellValue::from("Jon"));
        assert_eq!(row.field("age"), CellValue::Null);
        assert_eq!(row.field("missing"), CellValue::Null);
    }

    #[test]
    fn test_map_field_lookup() {
        let mut row = HashMap::new();
        row.insert("name".to_string(), CellValue::from("Arya"));

        assert_eq!(row.field("name"), CellValue::from("Arya"));
        assert_eq!(row.field("age"), CellValue::Null);
    }

    #[test]
    fn test_default_row_id() {
        assert_eq!(default_row_id(&json!({ "id": 7 }), 0), RowId::Int(7));
        assert_eq!(default_row_id(&json!({ "id": "a-1" }), 0), RowId::from("a-1"));
        assert_eq!(default_row_id(&json!({ "name": "x" }), 3), RowId::Int(3));
    }

    #[test]
    fn test_row_id_value_equality() {
        assert_eq!(RowId::from(1), RowId::from(1i64));
        assert_ne!(RowId::from(1), RowId::from("1"));
        assert_eq!(RowId::from(1).to_string(), "1");
    }
}
