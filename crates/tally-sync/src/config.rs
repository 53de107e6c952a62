//! # Sync Configuration

use std::time::Duration;

/// Default bound on waiting for an auth-state transition before a push
/// gives up and treats the session as unauthenticated.
pub const DEFAULT_AUTH_WAIT: Duration = Duration::from_secs(5);

/// Configuration for the sync bridge.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long an outbound push waits for authentication to resolve
    /// before silently skipping.
    pub auth_wait: Duration,

    /// Buffer size of each snapshot subscription channel.
    pub snapshot_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            auth_wait: DEFAULT_AUTH_WAIT,
            snapshot_capacity: 32,
        }
    }
}

impl SyncConfig {
    /// Sets the auth-resolution wait bound.
    pub fn auth_wait(mut self, wait: Duration) -> Self {
        self.auth_wait = wait;
        self
    }

    /// Sets the snapshot channel capacity.
    pub fn snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity.max(1);
        self
    }
}
