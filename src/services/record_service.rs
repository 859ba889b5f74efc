// src/services/record_service.rs
//
// Record Service - Record lifecycle
//
// CRITICAL RULES:
// - Defaults are applied at creation, never on read
// - Every write is validated against the entity type schema
// - A non-null belongs-to foreign key must point at an existing record
// - Deletes never cascade

use chrono::Utc;
use std::sync::Arc;

use crate::domain::{
    validate_record_fields, AssociationRoute, FieldMap, Predicate, Record, RecordId, Value,
};
use crate::error::{AppError, AppResult};
use crate::events::{EventBus, RecordCreated, RecordDeleted, RecordUpdated, ReferenceAssigned};
use crate::registry::AssociationRegistry;
use crate::repositories::RecordRepository;

pub struct RecordService {
    registry: Arc<AssociationRegistry>,
    record_repo: Arc<dyn RecordRepository>,
    event_bus: Arc<EventBus>,
}

impl RecordService {
    pub fn new(
        registry: Arc<AssociationRegistry>,
        record_repo: Arc<dyn RecordRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            registry,
            record_repo,
            event_bus,
        }
    }

    /// Create a record, filling omitted fields from their defaults
    pub fn create(&self, entity_type: &str, fields: FieldMap) -> AppResult<Record> {
        let schema = self.registry.entity_type(entity_type)?;
        let fields = schema.instantiate(fields);

        validate_record_fields(schema, &fields)?;
        self.check_references(entity_type, &fields)?;

        let record = self.record_repo.create(entity_type, &fields)?;
        log::debug!("Created {} #{}", record.entity_type, record.id);

        self.event_bus
            .emit(RecordCreated::new(record.entity_type.clone(), record.id));

        Ok(record)
    }

    /// Create a child through an owns-many association, with its foreign key
    /// set to `parent`
    pub fn build(&self, parent: &Record, association_name: &str, mut fields: FieldMap) -> AppResult<Record> {
        let association = self
            .registry
            .association(&parent.entity_type, association_name)?;

        let AssociationRoute::OwnsMany { foreign_key } = &association.route else {
            return Err(AppError::Configuration(format!(
                "Cannot build through '{}': it is a {} association",
                association.qualified_name(),
                association.kind()
            )));
        };

        fields.insert(foreign_key.clone(), Value::from(parent.id));
        self.create(&association.target, fields)
    }

    /// Set (or clear with `None`) the foreign key behind a belongs-to association
    pub fn assign(&self, child: &Record, association_name: &str, parent: Option<&Record>) -> AppResult<Record> {
        let association = self
            .registry
            .association(&child.entity_type, association_name)?;

        let AssociationRoute::BelongsTo { foreign_key } = &association.route else {
            return Err(AppError::Configuration(format!(
                "Cannot assign through '{}': it is a {} association",
                association.qualified_name(),
                association.kind()
            )));
        };

        if let Some(parent) = parent {
            if parent.entity_type != association.target {
                return Err(AppError::Configuration(format!(
                    "'{}' expects a {} record, got {}",
                    association.qualified_name(),
                    association.target,
                    parent.entity_type
                )));
            }
        }

        let target_id = parent.map(|p| p.id);
        let mut changes = FieldMap::new();
        changes.insert(foreign_key.clone(), Value::from(target_id));

        let updated = self.update(child, changes)?;

        self.event_bus.emit(ReferenceAssigned::new(
            updated.entity_type.clone(),
            updated.id,
            association.name.clone(),
            target_id,
        ));

        Ok(updated)
    }

    /// Apply field changes to a stored record.
    ///
    /// Changes are merged onto the stored row, not onto `record`, so a stale
    /// copy never overwrites other writes. The merged fields must satisfy
    /// every belongs-to reference.
    pub fn update(&self, record: &Record, changes: FieldMap) -> AppResult<Record> {
        let schema = self.registry.entity_type(&record.entity_type)?;
        validate_record_fields(schema, &changes)?;

        let mut updated = self
            .record_repo
            .find_by_id(&record.entity_type, record.id)?
            .ok_or(AppError::NotFound)?;
        let changed_fields: Vec<String> = changes.keys().cloned().collect();
        updated.fields.extend(changes);

        self.check_references(&updated.entity_type, &updated.fields)?;
        updated.updated_at = Utc::now();

        self.record_repo.update(&updated)?;

        log::debug!(
            "Updated {} #{} ({})",
            updated.entity_type,
            updated.id,
            changed_fields.join(", ")
        );
        self.event_bus.emit(RecordUpdated::new(
            updated.entity_type.clone(),
            updated.id,
            changed_fields,
        ));

        Ok(updated)
    }

    /// Remove a record. Records referencing it are left untouched.
    pub fn delete(&self, entity_type: &str, id: RecordId) -> AppResult<()> {
        self.registry.entity_type(entity_type)?;
        self.record_repo.delete(entity_type, id)?;

        log::debug!("Deleted {} #{}", entity_type, id);
        self.event_bus
            .emit(RecordDeleted::new(entity_type.to_string(), id));

        Ok(())
    }

    pub fn get(&self, entity_type: &str, id: RecordId) -> AppResult<Option<Record>> {
        self.registry.entity_type(entity_type)?;
        self.record_repo.find_by_id(entity_type, id)
    }

    pub fn find_all_where(&self, entity_type: &str, predicate: &Predicate) -> AppResult<Vec<Record>> {
        self.registry.entity_type(entity_type)?;
        self.record_repo.find_all_where(entity_type, predicate)
    }

    /// First record (in key order) whose `field` equals `value`
    pub fn find_by(&self, entity_type: &str, field: &str, value: impl Into<Value>) -> AppResult<Option<Record>> {
        Ok(self
            .find_all_where(entity_type, &Predicate::field_equals(field, value))?
            .into_iter()
            .next())
    }

    /// Most recently created record of an entity type
    pub fn last(&self, entity_type: &str) -> AppResult<Option<Record>> {
        self.registry.entity_type(entity_type)?;
        self.record_repo.find_last(entity_type)
    }

    pub fn count(&self, entity_type: &str) -> AppResult<i64> {
        self.registry.entity_type(entity_type)?;
        self.record_repo.count(entity_type)
    }

    /// Every non-null belongs-to foreign key present in `fields` must
    /// reference an existing record of the association's target type
    fn check_references(&self, entity_type: &str, fields: &FieldMap) -> AppResult<()> {
        for association in self.registry.associations_of(entity_type)? {
            let AssociationRoute::BelongsTo { foreign_key } = &association.route else {
                continue;
            };

            let Some(value) = fields.get(foreign_key) else {
                continue;
            };
            let id = match value {
                Value::Null => continue,
                Value::Integer(id) => RecordId::new(*id),
                other => {
                    return Err(AppError::UnreadableForeignKey {
                        entity_type: entity_type.to_string(),
                        foreign_key: foreign_key.clone(),
                        reason: format!("expected integer, got {}", other.type_name()),
                    })
                }
            };

            if self
                .record_repo
                .find_by_id(&association.target, id)?
                .is_none()
            {
                log::warn!(
                    "Rejected {}.{} = {}: no {} record",
                    entity_type,
                    foreign_key,
                    id,
                    association.target
                );
                return Err(AppError::DanglingReference {
                    entity_type: entity_type.to_string(),
                    foreign_key: foreign_key.clone(),
                    target: association.target.clone(),
                    id,
                });
            }
        }
        Ok(())
    }
}
