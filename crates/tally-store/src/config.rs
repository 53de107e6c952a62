//! # Store Configuration
//!
//! Configuration for the local keyed-record store.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the local store.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/tally.db").max_connections(2);
/// let store = LocalStore::open(config).await;
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file, or None for an in-memory store.
    pub database_path: Option<PathBuf>,

    /// Maximum number of connections in the pool.
    /// Default: 2 (a single-user app writes one record)
    pub max_connections: u32,

    /// Connection acquire timeout.
    pub connect_timeout: Duration,
}

impl StoreConfig {
    /// Creates a configuration pointing at the given database file.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: Some(path.into()),
            max_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Creates an in-memory store configuration (for tests).
    ///
    /// In-memory SQLite is per-connection, so the pool is pinned to a
    /// single connection.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: None,
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the platform default location for the store file
    /// (e.g. `~/.local/share/tally/tally.db` on Linux), or None when no
    /// home directory can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "tally")
            .map(|dirs| dirs.data_dir().join("tally.db"))
    }
}
