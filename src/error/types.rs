// src/error/types.rs
use crate::domain::{DomainError, RecordId};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown association '{association}' on entity type '{entity_type}'")]
    UnknownAssociation {
        entity_type: String,
        association: String,
    },

    #[error("Unknown entity type '{0}'")]
    UnknownEntityType(String),

    #[error("Dangling reference: {entity_type}.{foreign_key} = {id} has no {target} record")]
    DanglingReference {
        entity_type: String,
        foreign_key: String,
        target: String,
        id: RecordId,
    },

    #[error("Unreadable foreign key {entity_type}.{foreign_key}: {reason}")]
    UnreadableForeignKey {
        entity_type: String,
        foreign_key: String,
        reason: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found")]
    NotFound,

    #[error("Other error: {0}")]
    Other(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
