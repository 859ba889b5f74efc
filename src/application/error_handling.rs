// src/application/error_handling.rs
//
// Error Handling for Callers
//
// ARCHITECTURE:
// - Maps internal errors → caller-facing responses
// - Provides a consistent, serializable error format
// - Never exposes storage internals
// - Logs errors for debugging

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Record not found
    NotFound,

    /// Invalid registry declaration
    Configuration,

    /// Association name not declared on the entity type
    UnknownAssociation,

    /// Entity type not declared
    UnknownEntityType,

    /// Foreign key pointing at a missing record
    DanglingReference,

    /// Field values rejected by the schema
    Validation,

    /// Database/persistence error
    Database,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::new(ErrorType::NotFound, "Record not found", None),

            AppError::Configuration(message) => {
                Self::new(ErrorType::Configuration, "Invalid configuration", Some(message))
            }

            e @ AppError::UnknownAssociation { .. } => {
                Self::new(ErrorType::UnknownAssociation, "Unknown association", Some(e.to_string()))
            }

            AppError::UnknownEntityType(name) => Self::new(
                ErrorType::UnknownEntityType,
                "Unknown entity type",
                Some(name),
            ),

            e @ AppError::DanglingReference { .. } => {
                log::warn!("{}", e);
                Self::new(ErrorType::DanglingReference, "Dangling reference", Some(e.to_string()))
            }

            e @ AppError::UnreadableForeignKey { .. } => {
                Self::new(ErrorType::Validation, "Unreadable foreign key", Some(e.to_string()))
            }

            AppError::Domain(domain_error) => Self::new(
                ErrorType::Validation,
                "Field validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Internal,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message,
                    details: None,
                }
            }
        }
    }

    fn new(error_type: ErrorType, message: &str, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.to_string(),
            details,
        }
    }
}

/// Helper trait to convert Results to a serialized ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            let error_response = ErrorResponse::from_app_error(e);
            serde_json::to_string(&error_response).unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}
