//! Error types for the key-path store.

use thiserror::Error;

/// Main error type for store operations.
///
/// Reads of missing paths and deletes of absent paths are not errors; they
/// surface as `None` or as no-ops.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
