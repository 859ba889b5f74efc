pub mod entity;
pub mod invariants;

pub use entity::{Association, AssociationKind, AssociationOptions, AssociationRoute};
pub use invariants::validate_association;
