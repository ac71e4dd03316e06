//! # AppError
//!
//! Centralized error handling for the community forum crates.
//! The store itself never surfaces these from its mutations; they travel
//! through the storage port and the explicit persistence helpers.

use thiserror::Error;

/// The primary error type for all cf-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Community, Post, Comment)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., unknown vote direction, empty title)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Backing key-value store failure
    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Posts blob could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, AppError>;
