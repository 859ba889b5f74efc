// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO schema validation
// - NO reference checks
// - NO event emission
// - Explicit SQL only

pub mod record_repository;

pub use record_repository::{RecordRepository, SqliteRecordRepository};

#[cfg(test)]
pub use record_repository::MockRecordRepository;
