// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod association_service;
pub mod record_service;

#[cfg(test)]
pub(crate) mod test_fixtures;



pub use association_service::{AssociationService, Resolved};
pub use record_service::RecordService;
