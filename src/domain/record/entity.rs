use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult, FieldMap, Value};

/// Generated record key
///
/// Assigned by the store at creation, never mutated, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored instance of an entity type
///
/// Two records are equal when they have the same entity type and key,
/// regardless of field contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Immutable key
    pub id: RecordId,

    /// Entity type name
    pub entity_type: String,

    /// Field values, one entry per declared field
    pub fields: FieldMap,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value, `Null` when absent
    pub fn value(&self, field: &str) -> Value {
        self.get(field).cloned().unwrap_or_default()
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_text)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_integer)
    }

    pub fn boolean(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Read a foreign key field.
    ///
    /// `Null` or missing is `Ok(None)`; anything but an integer is an error.
    pub fn reference(&self, foreign_key: &str) -> DomainResult<Option<RecordId>> {
        match self.get(foreign_key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Integer(id)) => Ok(Some(RecordId::new(*id))),
            Some(other) => Err(DomainError::TypeMismatch {
                field: format!("{}.{}", self.entity_type, foreign_key),
                expected: crate::domain::FieldType::Integer,
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.entity_type == other.entity_type
    }
}

impl Eq for Record {}

/// Project one field out of each record, in order
pub fn pluck(records: &[Record], field: &str) -> Vec<Value> {
    records.iter().map(|r| r.value(field)).collect()
}
