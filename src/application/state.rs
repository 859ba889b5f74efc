// src/application/state.rs

use std::sync::Arc;

use crate::db::{
    create_connection_pool, get_connection, get_database_stats, initialize_database,
    ConnectionPool, DatabaseStats, StoreConfig,
};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::registry::AssociationRegistry;
use crate::repositories::{RecordRepository, SqliteRecordRepository};
use crate::services::{AssociationService, RecordService};

/// Everything a caller needs to work with one store.
/// All fields are Arc-wrapped for sharing across threads.
pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub registry: Arc<AssociationRegistry>,
    pub record_service: Arc<RecordService>,
    pub association_service: Arc<AssociationService>,
    pool: Arc<ConnectionPool>,
}

impl AppState {
    /// Open (or create) the store described by `config` and wire the services
    /// over the given registry.
    pub fn open(config: &StoreConfig, registry: AssociationRegistry) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        let event_bus = Arc::new(EventBus::new());
        let pool = Arc::new(create_connection_pool(config)?);

        // Initialize schema (idempotent)
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }

        // 2. REPOSITORIES
        let record_repo: Arc<dyn RecordRepository> =
            Arc::new(SqliteRecordRepository::new(pool.clone()));

        // 3. SERVICES
        let registry = Arc::new(registry);
        let record_service = Arc::new(RecordService::new(
            registry.clone(),
            record_repo.clone(),
            event_bus.clone(),
        ));
        let association_service = Arc::new(AssociationService::new(registry.clone(), record_repo));

        log::info!(
            "Store ready with {} entity type(s)",
            registry.entity_type_names().len()
        );

        Ok(Self {
            event_bus,
            registry,
            record_service,
            association_service,
            pool,
        })
    }

    pub fn in_memory(registry: AssociationRegistry) -> AppResult<Self> {
        Self::open(&StoreConfig::in_memory(), registry)
    }

    pub fn database_stats(&self) -> AppResult<DatabaseStats> {
        let conn = get_connection(&self.pool)?;
        get_database_stats(&conn)
    }
}
