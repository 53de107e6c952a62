//! # Store Error Types
//!
//! Error types for the persistence layer.
//!
//! Note the narrow surface: these describe what actually went wrong at
//! the backing medium, but the local store's public read/write path
//! (see [`crate::local`]) degrades them to defaults and booleans instead
//! of raising. Callers see the taxonomy only in logs.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the backing database.
    #[error("Failed to open store: {0}")]
    OpenFailed(String),

    /// A query against the backing database failed.
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// The persisted record could not be serialized or parsed.
    #[error("Store serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationFailed(err.to_string())
    }
}
