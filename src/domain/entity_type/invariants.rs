use std::collections::HashSet;

use super::entity::EntityType;
use crate::domain::{DomainError, DomainResult};

/// Name reserved for the record key
pub const RESERVED_KEY_FIELD: &str = "id";

/// Validates all EntityType invariants
pub fn validate_entity_type(entity_type: &EntityType) -> DomainResult<()> {
    validate_name(&entity_type.name)?;
    validate_fields(entity_type)?;
    Ok(())
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "Entity type name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Field names are non-empty, unique, never `id`, and defaults match the declared type
fn validate_fields(entity_type: &EntityType) -> DomainResult<()> {
    let mut seen = HashSet::new();

    for field in &entity_type.fields {
        if field.name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(format!(
                "Entity type '{}' declares a field with an empty name",
                entity_type.name
            )));
        }
        if field.name == RESERVED_KEY_FIELD {
            return Err(DomainError::InvariantViolation(format!(
                "Entity type '{}' cannot declare reserved field '{}'",
                entity_type.name, RESERVED_KEY_FIELD
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(DomainError::InvariantViolation(format!(
                "Entity type '{}' declares field '{}' twice",
                entity_type.name, field.name
            )));
        }
        if !field.default.fits(field.field_type) {
            return Err(DomainError::TypeMismatch {
                field: format!("{}.{}", entity_type.name, field.name),
                expected: field.field_type,
                found: field.default.type_name().to_string(),
            });
        }
    }

    Ok(())
}

/// Invariants that must hold true for an EntityType:
///
/// 1. Name is not blank
/// 2. Field names are not blank and unique
/// 3. `id` is never a declared field
/// 4. A default is `Null` or matches the declared field type
