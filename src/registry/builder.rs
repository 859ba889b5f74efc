// src/registry/builder.rs
//
// Registry builder
//
// Declarations are collected in any order. Local mistakes (missing options,
// duplicate names) fail at declare time; cross-references between entity
// types and associations are checked by `build`, so a registry that exists
// can always resolve every association it holds.

use std::collections::HashMap;

use crate::domain::{
    validate_association, validate_entity_type, Association, AssociationKind, AssociationOptions,
    AssociationRoute, DomainError, EntityType, FieldType,
};
use crate::error::{AppError, AppResult};

use super::association_registry::{AssociationRegistry, EntityEntry};

type AssociationKey<'a> = (&'a str, &'a str);

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entity_types: Vec<EntityType>,
    associations: Vec<Association>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity type and its field schema
    pub fn declare_entity_type(&mut self, entity_type: EntityType) -> AppResult<&mut Self> {
        validate_entity_type(&entity_type).map_err(configuration)?;

        if self.entity_types.iter().any(|e| e.name == entity_type.name) {
            return Err(AppError::Configuration(format!(
                "Entity type '{}' declared twice",
                entity_type.name
            )));
        }

        log::debug!("Declared entity type {}", entity_type.name);
        self.entity_types.push(entity_type);
        Ok(self)
    }

    /// Register an association on `entity_type`
    pub fn declare(
        &mut self,
        entity_type: &str,
        name: &str,
        kind: AssociationKind,
        target: &str,
        options: AssociationOptions,
    ) -> AppResult<&mut Self> {
        let association =
            validate_association(entity_type, name, kind, target, options).map_err(configuration)?;

        if self
            .associations
            .iter()
            .any(|a| a.owner == association.owner && a.name == association.name)
        {
            return Err(AppError::Configuration(format!(
                "Association '{}' declared twice",
                association.qualified_name()
            )));
        }

        log::debug!(
            "Declared {} association {} -> {}",
            association.kind(),
            association.qualified_name(),
            association.target
        );
        self.associations.push(association);
        Ok(self)
    }

    pub fn owns_many(
        &mut self,
        entity_type: &str,
        name: &str,
        target: &str,
        foreign_key: &str,
    ) -> AppResult<&mut Self> {
        self.declare(
            entity_type,
            name,
            AssociationKind::OwnsMany,
            target,
            AssociationOptions::foreign_key(foreign_key),
        )
    }

    pub fn belongs_to(
        &mut self,
        entity_type: &str,
        name: &str,
        target: &str,
        foreign_key: &str,
    ) -> AppResult<&mut Self> {
        self.declare(
            entity_type,
            name,
            AssociationKind::BelongsTo,
            target,
            AssociationOptions::foreign_key(foreign_key),
        )
    }

    pub fn indirect_many(
        &mut self,
        entity_type: &str,
        name: &str,
        target: &str,
        through: &str,
        source: &str,
    ) -> AppResult<&mut Self> {
        self.declare(
            entity_type,
            name,
            AssociationKind::IndirectMany,
            target,
            AssociationOptions::through(through, source),
        )
    }

    /// Validate every cross-reference and seal the registry
    pub fn build(self) -> AppResult<AssociationRegistry> {
        let schemas: HashMap<&str, &EntityType> = self
            .entity_types
            .iter()
            .map(|e| (e.name.as_str(), e))
            .collect();
        let lookup: HashMap<AssociationKey, &Association> = self
            .associations
            .iter()
            .map(|a| ((a.owner.as_str(), a.name.as_str()), a))
            .collect();

        for association in &self.associations {
            check_references(association, &schemas, &lookup)?;
        }
        for association in &self.associations {
            let mut path = Vec::new();
            check_acyclic(association, &lookup, &mut path)?;
        }

        log::info!(
            "Association registry sealed: {} entity types, {} associations",
            self.entity_types.len(),
            self.associations.len()
        );

        let mut entries = HashMap::new();
        for entity_type in self.entity_types {
            let associations = self
                .associations
                .iter()
                .filter(|a| a.owner == entity_type.name)
                .cloned()
                .collect();
            entries.insert(
                entity_type.name.clone(),
                EntityEntry {
                    entity_type,
                    associations,
                },
            );
        }

        Ok(AssociationRegistry::from_entries(entries))
    }
}

fn configuration(err: DomainError) -> AppError {
    AppError::Configuration(err.to_string())
}

fn check_references(
    association: &Association,
    schemas: &HashMap<&str, &EntityType>,
    lookup: &HashMap<AssociationKey, &Association>,
) -> AppResult<()> {
    let qualified = association.qualified_name();

    let owner = schemas.get(association.owner.as_str()).ok_or_else(|| {
        AppError::Configuration(format!(
            "'{}' is declared on unknown entity type '{}'",
            qualified, association.owner
        ))
    })?;
    let target = schemas.get(association.target.as_str()).ok_or_else(|| {
        AppError::Configuration(format!(
            "'{}' targets unknown entity type '{}'",
            qualified, association.target
        ))
    })?;

    if owner.has_field(&association.name) {
        return Err(AppError::Configuration(format!(
            "'{}' shadows a field of the same name",
            qualified
        )));
    }

    match &association.route {
        AssociationRoute::OwnsMany { foreign_key } => {
            require_key_field(&qualified, target, foreign_key)
        }
        AssociationRoute::BelongsTo { foreign_key } => {
            require_key_field(&qualified, owner, foreign_key)
        }
        AssociationRoute::IndirectMany { through, source } => {
            let through_assoc = lookup
                .get(&(association.owner.as_str(), through.as_str()))
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "'{}' routes through undeclared association '{}.{}'",
                        qualified, association.owner, through
                    ))
                })?;
            let source_assoc = lookup
                .get(&(through_assoc.target.as_str(), source.as_str()))
                .ok_or_else(|| {
                    AppError::Configuration(format!(
                        "'{}' uses undeclared source association '{}.{}'",
                        qualified, through_assoc.target, source
                    ))
                })?;

            if source_assoc.target != association.target {
                return Err(AppError::Configuration(format!(
                    "'{}' targets '{}' but its source '{}' yields '{}'",
                    qualified,
                    association.target,
                    source_assoc.qualified_name(),
                    source_assoc.target
                )));
            }
            Ok(())
        }
    }
}

/// Foreign keys are declared integer fields
fn require_key_field(qualified: &str, holder: &EntityType, foreign_key: &str) -> AppResult<()> {
    match holder.field_def(foreign_key) {
        Some(def) if def.field_type == FieldType::Integer => Ok(()),
        Some(def) => Err(AppError::Configuration(format!(
            "'{}' uses foreign key {}.{} of type {}, expected integer",
            qualified, holder.name, foreign_key, def.field_type
        ))),
        None => Err(AppError::Configuration(format!(
            "'{}' uses foreign key {}.{} which is not a declared field",
            qualified, holder.name, foreign_key
        ))),
    }
}

/// Indirect associations must bottom out in direct ones
fn check_acyclic(
    association: &Association,
    lookup: &HashMap<AssociationKey, &Association>,
    path: &mut Vec<String>,
) -> AppResult<()> {
    let AssociationRoute::IndirectMany { through, source } = &association.route else {
        return Ok(());
    };

    let qualified = association.qualified_name();
    if path.contains(&qualified) {
        return Err(AppError::Configuration(format!(
            "Indirect association cycle: {} -> {}",
            path.join(" -> "),
            qualified
        )));
    }

    path.push(qualified);
    if let Some(through_assoc) = lookup.get(&(association.owner.as_str(), through.as_str())) {
        check_acyclic(through_assoc, lookup, path)?;
        if let Some(source_assoc) = lookup.get(&(through_assoc.target.as_str(), source.as_str())) {
            check_acyclic(source_assoc, lookup, path)?;
        }
    }
    path.pop();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AssociationKind;

    fn blog() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new();
        builder
            .declare_entity_type(EntityType::new("User").field("name", FieldType::Text))
            .unwrap()
            .declare_entity_type(
                EntityType::new("Post")
                    .field("title", FieldType::Text)
                    .field("body", FieldType::Text)
                    .field("user_id", FieldType::Integer),
            )
            .unwrap()
            .declare_entity_type(
                EntityType::new("Comment")
                    .field("comment", FieldType::Text)
                    .field("post_id", FieldType::Integer)
                    .field("user_id", FieldType::Integer),
            )
            .unwrap();
        builder
            .owns_many("User", "posts", "Post", "user_id")
            .unwrap()
            .belongs_to("Post", "user", "User", "user_id")
            .unwrap()
            .owns_many("Post", "comments", "Comment", "post_id")
            .unwrap()
            .belongs_to("Comment", "user", "User", "user_id")
            .unwrap()
            .indirect_many("Post", "commenters", "User", "comments", "user")
            .unwrap();
        builder
    }

    #[test]
    fn test_build_valid_registry() {
        let registry = blog().build().unwrap();

        assert_eq!(registry.entity_type_names(), vec!["Comment", "Post", "User"]);
        let commenters = registry.association("Post", "commenters").unwrap();
        assert_eq!(commenters.kind(), AssociationKind::IndirectMany);

        let names: Vec<_> = registry
            .associations_of("Post")
            .unwrap()
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["user", "comments", "commenters"]);
    }

    #[test]
    fn test_indirect_hops() {
        let registry = blog().build().unwrap();
        let commenters = registry.association("Post", "commenters").unwrap();

        let (through, source) = registry.indirect_hops(commenters).unwrap();
        assert_eq!(through.qualified_name(), "Post.comments");
        assert_eq!(source.qualified_name(), "Comment.user");
    }

    #[test]
    fn test_unknown_association_lookup() {
        let registry = blog().build().unwrap();

        assert!(matches!(
            registry.association("Post", "tags"),
            Err(AppError::UnknownAssociation { .. })
        ));
        assert!(matches!(
            registry.association("Tag", "posts"),
            Err(AppError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn test_missing_source_fails_at_build() {
        let mut builder = blog();
        builder
            .indirect_many("User", "commenters", "User", "posts", "readers")
            .unwrap();

        assert!(matches!(builder.build(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_missing_through_fails_at_build() {
        let mut builder = blog();
        builder
            .indirect_many("User", "comments_received", "Comment", "articles", "comments")
            .unwrap();

        assert!(matches!(builder.build(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_indirect_target_must_match_source() {
        let mut builder = blog();
        builder
            .indirect_many("User", "comments_received", "User", "posts", "comments")
            .unwrap();

        assert!(matches!(builder.build(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_foreign_key_must_be_declared_integer() {
        let mut builder = blog();
        builder.owns_many("User", "comments_left", "Comment", "author_id").unwrap();
        assert!(builder.build().is_err());

        let mut builder = blog();
        builder.belongs_to("Post", "owner", "User", "title").unwrap();
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_unknown_target_fails() {
        let mut builder = blog();
        builder.owns_many("User", "tags", "Tag", "user_id").unwrap();

        assert!(matches!(builder.build(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_declarations_fail() {
        let mut builder = blog();
        assert!(builder.owns_many("User", "posts", "Post", "user_id").is_err());
        assert!(builder
            .declare_entity_type(EntityType::new("User"))
            .is_err());
    }

    #[test]
    fn test_association_cannot_shadow_field() {
        let mut builder = blog();
        builder.belongs_to("Comment", "comment", "Post", "post_id").unwrap();

        assert!(builder.build().is_err());
    }

    #[test]
    fn test_indirect_cycle_fails() {
        let mut builder = RegistryBuilder::new();
        builder
            .declare_entity_type(EntityType::new("Node").field("parent_id", FieldType::Integer))
            .unwrap();
        builder
            .indirect_many("Node", "a", "Node", "b", "a")
            .unwrap()
            .indirect_many("Node", "b", "Node", "a", "b")
            .unwrap();

        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("cycle"), "unexpected error: {}", err);
    }
}
