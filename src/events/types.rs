// src/events/types.rs
//
// Record lifecycle events.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - Association resolution is a read and emits nothing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::RecordId;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

macro_rules! impl_domain_event {
    ($ty:ident) => {
        impl DomainEvent for $ty {
            fn event_id(&self) -> Uuid {
                self.event_id
            }
            fn occurred_at(&self) -> DateTime<Utc> {
                self.occurred_at
            }
            fn event_type(&self) -> &'static str {
                stringify!($ty)
            }
        }
    };
}

/// Emitted after a record is stored and its key assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entity_type: String,
    pub record_id: RecordId,
}

impl RecordCreated {
    pub fn new(entity_type: String, record_id: RecordId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entity_type,
            record_id,
        }
    }
}

impl_domain_event!(RecordCreated);

/// Emitted after field values of a record change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entity_type: String,
    pub record_id: RecordId,
    pub changed_fields: Vec<String>,
}

impl RecordUpdated {
    pub fn new(entity_type: String, record_id: RecordId, changed_fields: Vec<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entity_type,
            record_id,
            changed_fields,
        }
    }
}

impl_domain_event!(RecordUpdated);

/// Emitted after a record is removed. Nothing cascades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entity_type: String,
    pub record_id: RecordId,
}

impl RecordDeleted {
    pub fn new(entity_type: String, record_id: RecordId) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entity_type,
            record_id,
        }
    }
}

impl_domain_event!(RecordDeleted);

/// Emitted when a belongs-to foreign key is set or cleared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceAssigned {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub entity_type: String,
    pub record_id: RecordId,
    pub association: String,
    pub target_id: Option<RecordId>,
}

impl ReferenceAssigned {
    pub fn new(
        entity_type: String,
        record_id: RecordId,
        association: String,
        target_id: Option<RecordId>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            entity_type,
            record_id,
            association,
            target_id,
        }
    }
}

impl_domain_event!(ReferenceAssigned);
