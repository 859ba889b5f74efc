use serde::{Deserialize, Serialize};

use super::entity::{Record, RecordId};
use crate::domain::Value;

/// Filter accepted by `RecordRepository::find_all_where`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Every record of the entity type
    All,
    /// Field equals value; `Null` also matches a missing field
    FieldEquals { field: String, value: Value },
    /// Field equals any of the values
    FieldIn { field: String, values: Vec<Value> },
    /// Record key is one of the ids
    IdIn { ids: Vec<RecordId> },
    /// All nested predicates hold
    And { predicates: Vec<Predicate> },
}

impl Predicate {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Predicate::FieldIn {
            field: field.into(),
            values,
        }
    }

    pub fn id_in(ids: Vec<RecordId>) -> Self {
        Predicate::IdIn { ids }
    }

    pub fn and(predicates: Vec<Predicate>) -> Self {
        Predicate::And { predicates }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::FieldEquals { field, value } => record.value(field) == *value,
            Predicate::FieldIn { field, values } => {
                let actual = record.value(field);
                values.iter().any(|v| *v == actual)
            }
            Predicate::IdIn { ids } => ids.contains(&record.id),
            Predicate::And { predicates } => predicates.iter().all(|p| p.matches(record)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use chrono::Utc;

    fn comment(id: i64, post_id: i64, text: &str) -> Record {
        let now = Utc::now();
        Record {
            id: RecordId::new(id),
            entity_type: "Comment".to_string(),
            fields: fields! { "post_id" => post_id, "comment" => text },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_field_equals() {
        let c = comment(1, 4, "first");
        assert!(Predicate::field_equals("post_id", 4).matches(&c));
        assert!(!Predicate::field_equals("post_id", 5).matches(&c));
    }

    #[test]
    fn test_null_matches_missing_field() {
        let c = comment(1, 4, "first");
        assert!(Predicate::field_equals("user_id", Value::Null).matches(&c));
    }

    #[test]
    fn test_field_in_and_id_in() {
        let c = comment(2, 4, "second");
        assert!(Predicate::field_in("post_id", vec![Value::from(3), Value::from(4)]).matches(&c));
        assert!(Predicate::id_in(vec![RecordId::new(2)]).matches(&c));
        assert!(!Predicate::id_in(vec![]).matches(&c));
    }

    #[test]
    fn test_and_requires_all() {
        let c = comment(2, 4, "second");
        let both = Predicate::and(vec![
            Predicate::field_equals("post_id", 4),
            Predicate::field_equals("comment", "second"),
        ]);
        let mismatch = Predicate::and(vec![
            Predicate::field_equals("post_id", 4),
            Predicate::field_equals("comment", "first"),
        ]);

        assert!(both.matches(&c));
        assert!(!mismatch.matches(&c));
        assert!(Predicate::and(vec![]).matches(&c));
    }
}
