// src/registry/association_registry.rs
//
// Sealed association registry
//
// Built once by `RegistryBuilder::build`, immutable afterwards and safe to
// share across threads behind an `Arc`.

use std::collections::HashMap;

use crate::domain::{Association, AssociationRoute, EntityType};
use crate::error::{AppError, AppResult};

use super::builder::RegistryBuilder;

/// Everything declared for one entity type
#[derive(Debug, Clone)]
pub(crate) struct EntityEntry {
    pub(crate) entity_type: EntityType,

    /// Declaration order
    pub(crate) associations: Vec<Association>,
}

/// Validated entity types and their associations
#[derive(Debug, Clone)]
pub struct AssociationRegistry {
    entries: HashMap<String, EntityEntry>,
}

impl AssociationRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Only the builder constructs registries, after validation
    pub(crate) fn from_entries(entries: HashMap<String, EntityEntry>) -> Self {
        Self { entries }
    }

    pub fn entity_type(&self, name: &str) -> AppResult<&EntityType> {
        self.entry(name).map(|e| &e.entity_type)
    }

    pub fn has_entity_type(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entity type names, sorted
    pub fn entity_type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a declared association.
    ///
    /// Fails with `UnknownEntityType` or `UnknownAssociation`.
    pub fn association(&self, entity_type: &str, name: &str) -> AppResult<&Association> {
        self.entry(entity_type)?
            .associations
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| AppError::UnknownAssociation {
                entity_type: entity_type.to_string(),
                association: name.to_string(),
            })
    }

    /// Associations declared on an entity type, in declaration order
    pub fn associations_of(&self, entity_type: &str) -> AppResult<&[Association]> {
        self.entry(entity_type).map(|e| e.associations.as_slice())
    }

    /// The `through` and `source` associations of an indirect association.
    ///
    /// A missing hop is reported as a configuration error, never as an
    /// unknown association on the caller's side.
    pub fn indirect_hops(&self, association: &Association) -> AppResult<(&Association, &Association)> {
        let (through, source) = match &association.route {
            AssociationRoute::IndirectMany { through, source } => (through, source),
            _ => {
                return Err(AppError::Configuration(format!(
                    "'{}' is not an indirect-many association",
                    association.qualified_name()
                )))
            }
        };

        let through_assoc = self
            .association(&association.owner, through)
            .map_err(|e| missing_hop(association, "through", e))?;
        let source_assoc = self
            .association(&through_assoc.target, source)
            .map_err(|e| missing_hop(association, "source", e))?;

        Ok((through_assoc, source_assoc))
    }

    fn entry(&self, entity_type: &str) -> AppResult<&EntityEntry> {
        self.entries
            .get(entity_type)
            .ok_or_else(|| AppError::UnknownEntityType(entity_type.to_string()))
    }
}

fn missing_hop(association: &Association, hop: &str, cause: AppError) -> AppError {
    AppError::Configuration(format!(
        "{} association of '{}' cannot be resolved: {}",
        hop,
        association.qualified_name(),
        cause
    ))
}
