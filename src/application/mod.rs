// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits above services and wires them over one store
// - Translates internal errors into caller-facing responses

pub mod error_handling;
pub mod state;

pub use error_handling::{ErrorResponse, ErrorType, ToErrorResponse};
pub use state::AppState;
