// src/lib.rs
// Linkage - In-process association resolver over a record store
//
// Architecture:
// - Domain-centric: schemas, associations and records live in the domain
// - Declarative: associations are declared once in a registry and validated at build time
// - Explicit: every foreign key and hop is named, no inflection
// - Event-driven: record writes are announced on a synchronous bus
// - Read-only resolution: resolving never writes

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod registry;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    pluck,
    validate_association,
    validate_entity_type,
    validate_record_fields,
    // Associations
    Association,
    AssociationKind,
    AssociationOptions,
    AssociationRoute,
    DomainError,
    DomainResult,
    // Entity types
    EntityType,
    FieldDef,
    FieldMap,
    FieldType,
    // Records
    Predicate,
    Record,
    RecordId,
    Value,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus, DomainEvent, EventBus, EventLogEntry, RecordCreated, RecordDeleted,
    RecordUpdated, ReferenceAssigned,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool, StoreConfig, StoreLocation};

// ============================================================================
// PUBLIC API - Registry
// ============================================================================

pub use registry::{AssociationRegistry, RegistryBuilder};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{RecordRepository, SqliteRecordRepository};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{AssociationService, RecordService, Resolved};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse, ErrorType};
