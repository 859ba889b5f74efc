// src/error/mod.rs
//
// Service-boundary error type

pub mod types;

pub use types::{AppError, AppResult};
