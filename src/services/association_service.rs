// src/services/association_service.rs
//
// Association Service - Resolution of declared associations
//
// CRITICAL RULES:
// - Resolution is a pure read: no writes, no events
// - One store lookup per hop, batched across every owner at that hop
// - Order follows the underlying collections; duplicates are kept
// - Failure is atomic: a typed error or the full result, never a partial one

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{pluck, Association, AssociationRoute, Predicate, Record, RecordId, Value};
use crate::error::{AppError, AppResult};
use crate::registry::AssociationRegistry;
use crate::repositories::RecordRepository;

/// Result of resolving one association for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// `owns-many` / `indirect-many`
    Many(Vec<Record>),
    /// `belongs-to`
    One(Option<Record>),
}

impl Resolved {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Resolved::Many(records) => records,
            Resolved::One(record) => record.into_iter().collect(),
        }
    }

    pub fn records(&self) -> &[Record] {
        match self {
            Resolved::Many(records) => records,
            Resolved::One(Some(record)) => std::slice::from_ref(record),
            Resolved::One(None) => &[],
        }
    }

    /// The single related record; `None` for an unset belongs-to or an empty collection
    pub fn into_one(self) -> Option<Record> {
        self.into_records().into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn pluck(&self, field: &str) -> Vec<Value> {
        pluck(self.records(), field)
    }
}

pub struct AssociationService {
    registry: Arc<AssociationRegistry>,
    record_repo: Arc<dyn RecordRepository>,
}

impl AssociationService {
    pub fn new(registry: Arc<AssociationRegistry>, record_repo: Arc<dyn RecordRepository>) -> Self {
        Self {
            registry,
            record_repo,
        }
    }

    /// Resolve `association_name` for `record`.
    ///
    /// Fails with `UnknownAssociation` when the name is not declared on the
    /// record's entity type.
    pub fn resolve(&self, record: &Record, association_name: &str) -> AppResult<Resolved> {
        let association = self
            .registry
            .association(&record.entity_type, association_name)?;

        let related = self
            .resolve_groups(std::slice::from_ref(record), association)?
            .pop()
            .unwrap_or_default();

        log::debug!(
            "Resolved {} for {} #{}: {} record(s)",
            association.qualified_name(),
            record.entity_type,
            record.id,
            related.len()
        );

        Ok(shape(association, related))
    }

    /// Resolve one association for several records of the same entity type,
    /// with the same number of store lookups as a single `resolve`.
    pub fn resolve_many(&self, records: &[Record], association_name: &str) -> AppResult<Vec<Resolved>> {
        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };

        if let Some(other) = records.iter().find(|r| r.entity_type != first.entity_type) {
            return Err(AppError::Other(format!(
                "Cannot batch-resolve records of different entity types ({} and {})",
                first.entity_type, other.entity_type
            )));
        }

        let association = self
            .registry
            .association(&first.entity_type, association_name)?;

        Ok(self
            .resolve_groups(records, association)?
            .into_iter()
            .map(|group| shape(association, group))
            .collect())
    }

    /// Resolve and project one field of each related record
    pub fn pluck(&self, record: &Record, association_name: &str, field: &str) -> AppResult<Vec<Value>> {
        Ok(self.resolve(record, association_name)?.pluck(field))
    }

    pub fn count(&self, record: &Record, association_name: &str) -> AppResult<usize> {
        Ok(self.resolve(record, association_name)?.len())
    }

    /// Related records for each owner, aligned with `owners`.
    fn resolve_groups(&self, owners: &[Record], association: &Association) -> AppResult<Vec<Vec<Record>>> {
        if owners.is_empty() {
            return Ok(Vec::new());
        }

        match &association.route {
            AssociationRoute::OwnsMany { foreign_key } => {
                self.resolve_owns_many(owners, association, foreign_key)
            }
            AssociationRoute::BelongsTo { foreign_key } => {
                self.resolve_belongs_to(owners, association, foreign_key)
            }
            AssociationRoute::IndirectMany { .. } => self.resolve_indirect(owners, association),
        }
    }

    fn resolve_owns_many(
        &self,
        owners: &[Record],
        association: &Association,
        foreign_key: &str,
    ) -> AppResult<Vec<Vec<Record>>> {
        let mut owner_ids: Vec<RecordId> = owners.iter().map(|o| o.id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let predicate = Predicate::field_in(
            foreign_key,
            owner_ids.into_iter().map(Value::from).collect(),
        );
        let children = self
            .record_repo
            .find_all_where(&association.target, &predicate)?;

        let mut by_owner: HashMap<RecordId, Vec<Record>> = HashMap::new();
        for child in children {
            if let Some(owner_id) = read_foreign_key(&child, foreign_key)? {
                by_owner.entry(owner_id).or_default().push(child);
            }
        }

        Ok(owners
            .iter()
            .map(|o| by_owner.get(&o.id).cloned().unwrap_or_default())
            .collect())
    }

    fn resolve_belongs_to(
        &self,
        owners: &[Record],
        association: &Association,
        foreign_key: &str,
    ) -> AppResult<Vec<Vec<Record>>> {
        let references = owners
            .iter()
            .map(|o| read_foreign_key(o, foreign_key))
            .collect::<AppResult<Vec<_>>>()?;

        let mut ids: Vec<RecordId> = references.iter().flatten().copied().collect();
        if ids.is_empty() {
            return Ok(vec![Vec::new(); owners.len()]);
        }
        ids.sort_unstable();
        ids.dedup();

        let parents: HashMap<RecordId, Record> = self
            .record_repo
            .find_all_where(&association.target, &Predicate::id_in(ids))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        owners
            .iter()
            .zip(references)
            .map(|(owner, reference)| match reference {
                None => Ok(Vec::new()),
                Some(id) => parents
                    .get(&id)
                    .cloned()
                    .map(|parent| vec![parent])
                    .ok_or_else(|| AppError::DanglingReference {
                        entity_type: owner.entity_type.clone(),
                        foreign_key: foreign_key.to_string(),
                        target: association.target.clone(),
                        id,
                    }),
            })
            .collect()
    }

    /// `through` for every owner, then `source` for every intermediate record
    /// in one batch, re-split per owner in intermediate order.
    fn resolve_indirect(&self, owners: &[Record], association: &Association) -> AppResult<Vec<Vec<Record>>> {
        let (through, source) = self.registry.indirect_hops(association)?;

        let intermediate_groups = self.resolve_groups(owners, through)?;
        let intermediates: Vec<Record> = intermediate_groups.iter().flatten().cloned().collect();

        let mut terminal_groups = self.resolve_groups(&intermediates, source)?.into_iter();

        let mut result = Vec::with_capacity(owners.len());
        for group in &intermediate_groups {
            let mut related = Vec::new();
            for _ in group {
                related.extend(terminal_groups.next().unwrap_or_default());
            }
            result.push(related);
        }

        Ok(result)
    }
}

fn shape(association: &Association, related: Vec<Record>) -> Resolved {
    if association.is_singular() {
        Resolved::One(related.into_iter().next())
    } else {
        Resolved::Many(related)
    }
}

fn read_foreign_key(record: &Record, foreign_key: &str) -> AppResult<Option<RecordId>> {
    record
        .reference(foreign_key)
        .map_err(|e| AppError::UnreadableForeignKey {
            entity_type: record.entity_type.clone(),
            foreign_key: foreign_key.to_string(),
            reason: e.to_string(),
        })
}
