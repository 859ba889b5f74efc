// src/registry/mod.rs
//
// Association Registry
//
// Holds, per entity type, the declared field schema and associations.
// Populated once through `RegistryBuilder`, read-only afterwards.

pub mod association_registry;
pub mod builder;

pub use association_registry::AssociationRegistry;
pub use builder::RegistryBuilder;
