use serde::{Deserialize, Serialize};

use crate::domain::{FieldMap, FieldType, Value};

/// A named record kind with a fixed field schema
///
/// Field order is declaration order. The record key is not a field:
/// every record carries it separately as `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    /// Literal entity type name, used verbatim everywhere (no inflection)
    pub name: String,

    /// Declared fields
    pub fields: Vec<FieldDef>,
}

/// A single declared field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,

    /// Value applied at creation when the caller leaves the field out
    pub default: Value,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field whose default is `Null`
    pub fn field(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field_with_default(name, field_type, Value::Null)
    }

    /// Declare a field with an explicit default
    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        field_type: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            field_type,
            default: default.into(),
        });
        self
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_def(name).is_some()
    }

    /// Fill every declared field the caller did not supply with its default.
    /// Supplied values are kept as-is, including undeclared ones (validation
    /// reports those).
    pub fn instantiate(&self, mut fields: FieldMap) -> FieldMap {
        for def in &self.fields {
            fields
                .entry(def.name.clone())
                .or_insert_with(|| def.default.clone());
        }
        fields
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
