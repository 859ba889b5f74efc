// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod association;
pub mod entity_type;
pub mod record;
pub mod value;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Values
pub use value::{FieldMap, FieldType, Value};

// Entity types
pub use entity_type::{validate_entity_type, EntityType, FieldDef};

// Associations
pub use association::{
    validate_association, Association, AssociationKind, AssociationOptions, AssociationRoute,
};

// Records
pub use record::{pluck, validate_record_fields, Predicate, Record, RecordId};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of schema rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Unknown field '{field}' on entity type '{entity_type}'")]
    UnknownField { entity_type: String, field: String },

    #[error("Field {field} expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: String,
    },
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
