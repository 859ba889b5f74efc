pub mod entity;
pub mod invariants;

pub use entity::{EntityType, FieldDef};
pub use invariants::validate_entity_type;
