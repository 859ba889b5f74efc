use crate::domain::{DomainError, DomainResult, EntityType, FieldMap};

/// Validates a field map against its entity type schema
///
/// Every key must be a declared field and every value must be `Null` or of
/// the declared type. Missing fields are allowed here; the record service
/// fills them from defaults before calling this.
pub fn validate_record_fields(entity_type: &EntityType, fields: &FieldMap) -> DomainResult<()> {
    for (name, value) in fields {
        let def = entity_type
            .field_def(name)
            .ok_or_else(|| DomainError::UnknownField {
                entity_type: entity_type.name.clone(),
                field: name.clone(),
            })?;

        if !value.fits(def.field_type) {
            return Err(DomainError::TypeMismatch {
                field: format!("{}.{}", entity_type.name, name),
                expected: def.field_type,
                found: value.type_name().to_string(),
            });
        }
    }
    Ok(())
}

/// Invariants that must hold true for a Record:
///
/// 1. Identity is assigned by the store and never changes
/// 2. Only declared fields are stored
/// 3. Field values are `Null` or match the declared type
/// 4. A non-null belongs-to foreign key references an existing record
///    (checked by the record service, which can see the store)

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldType;
    use crate::fields;

    fn user() -> EntityType {
        EntityType::new("User").field("name", FieldType::Text)
    }

    #[test]
    fn test_valid_fields() {
        assert!(validate_record_fields(&user(), &fields! { "name" => "Mei" }).is_ok());
    }

    #[test]
    fn test_null_is_valid() {
        assert!(validate_record_fields(&user(), &fields! { "name" => crate::domain::Value::Null }).is_ok());
    }

    #[test]
    fn test_unknown_field_fails() {
        let result = validate_record_fields(&user(), &fields! { "nickname" => "M" });
        assert!(matches!(result, Err(DomainError::UnknownField { .. })));
    }

    #[test]
    fn test_non_finite_float_fails() {
        let reading = EntityType::new("Reading").field("x", FieldType::Float);

        let result = validate_record_fields(&reading, &fields! { "x" => f64::NAN });
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
        assert!(validate_record_fields(&reading, &fields! { "x" => 1.5 }).is_ok());
    }

    #[test]
    fn test_wrong_type_fails() {
        let result = validate_record_fields(&user(), &fields! { "name" => 5 });
        assert!(matches!(result, Err(DomainError::TypeMismatch { .. })));
    }
}
