// src/domain/value.rs
//
// Scalar values and field types
//
// Values are stored as plain JSON scalars inside a record's field map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::RecordId;

/// Field name -> value, as stored on a record
pub type FieldMap = BTreeMap<String, Value>;

/// Declared scalar type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    Float,
    Text,
    Boolean,
}

/// A single field value
///
/// `Null` is accepted by every field type; foreign keys stay `Null` until set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Scalar type of this value, `None` for `Null`
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(FieldType::Boolean),
            Value::Integer(_) => Some(FieldType::Integer),
            Value::Float(_) => Some(FieldType::Float),
            Value::Text(_) => Some(FieldType::Text),
        }
    }

    /// Whether this value may be stored in a field of the given type.
    /// NaN and infinities never fit: JSON has no encoding for them.
    pub fn fits(&self, field_type: FieldType) -> bool {
        match self {
            Value::Null => true,
            Value::Float(x) if !x.is_finite() => false,
            other => other.field_type() == Some(field_type),
        }
    }

    /// Short type label used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(x) if !x.is_finite() => "non-finite float",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<RecordId> for Value {
    fn from(id: RecordId) -> Self {
        Value::Integer(id.value())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Text => write!(f, "text"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_fits_every_type() {
        for ty in [FieldType::Integer, FieldType::Float, FieldType::Text, FieldType::Boolean] {
            assert!(Value::Null.fits(ty));
        }
    }

    #[test]
    fn test_integer_does_not_fit_text() {
        assert!(!Value::Integer(1).fits(FieldType::Text));
        assert!(Value::Integer(1).fits(FieldType::Integer));
    }

    #[test]
    fn test_non_finite_float_fits_nothing() {
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(!Value::Float(x).fits(FieldType::Float));
            assert_eq!(Value::Float(x).type_name(), "non-finite float");
        }
        assert!(Value::Float(-0.5).fits(FieldType::Float));
    }

    #[test]
    fn test_json_form_is_plain_scalar() {
        let mut map = FieldMap::new();
        map.insert("name".to_string(), Value::from("Sara"));
        map.insert("post_id".to_string(), Value::Null);
        map.insert("diseased".to_string(), Value::from(false));

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"diseased":false,"name":"Sara","post_id":null}"#);

        let back: FieldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_integer_json_stays_integer() {
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Integer(42));
    }
}
