//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Handling Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  AlreadyExists   → expected on outbound create; the bridge falls   │
//! │                    back to update, callers never see it            │
//! │  Unavailable     → surfaced for creates/updates, swallowed for     │
//! │                    deletes (local deletion is authoritative)       │
//! │  SubscribeFailed → start() aborts; no partial subscription set     │
//! │                    is left behind                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering remote-store and bridge failures.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// A create collided with an existing remote record.
    ///
    /// This is the expected signal driving the create-or-update
    /// fallback, not a real failure.
    #[error("{entity_type} {id} already exists remotely")]
    AlreadyExists { entity_type: String, id: String },

    /// An update targeted a record the remote does not hold.
    #[error("{entity_type} {id} not found remotely")]
    NotFound { entity_type: String, id: String },

    /// The remote store rejected or could not serve the request.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    /// Establishing a subscription failed.
    #[error("Subscription failed: {0}")]
    SubscribeFailed(String),

    /// A snapshot channel closed unexpectedly.
    #[error("Snapshot channel closed: {0}")]
    ChannelClosed(String),
}

impl SyncError {
    /// Builds the create-collision signal for an entity.
    pub fn already_exists(entity_type: &str, id: &str) -> Self {
        SyncError::AlreadyExists {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Builds the missing-record error for an entity.
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        SyncError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// True for the expected create-collision signal.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, SyncError::AlreadyExists { .. })
    }

    /// True when retrying the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Unavailable(_) | SyncError::SubscribeFailed(_)
        )
    }
}
