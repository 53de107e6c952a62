//! # tally-sync: Remote Sync Bridge for Tally
//!
//! Reconciles the local collection stores with a remote keyed document
//! store for cross-device sync.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   local mutation ──► push_*() ──► create ──(AlreadyExists)──►      │
//! │                                              update                 │
//! │                                                                     │
//! │   remote snapshot ──► equality check ──► seed-overlay merge         │
//! │        (subscription)        │            (categories only)         │
//! │                              ▼                                      │
//! │                     store.replace_all() ──► auto-persist            │
//! │                                                                     │
//! │   local delete ──► delete_*_remote() (best-effort, errors           │
//! │                    swallowed; local deletion is authoritative)     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`bridge`] - The [`SyncBridge`] subscription lifecycle and push path
//! - [`merge`] - Pure merge rules and content-equality change detection
//! - [`remote`] - [`RemoteStore`]/[`AuthProvider`] collaborator traits
//! - [`memory`] - In-memory collaborators for tests and demos
//! - [`config`] - Bridge configuration
//! - [`error`] - Sync error types
//!
//! The bridge owns no data: the collection stores stay authoritative
//! locally, the remote store is authoritative across devices, and
//! consistency comes from idempotent content-equality merges rather
//! than locks.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bridge;
pub mod config;
pub mod error;
pub mod memory;
pub mod merge;
pub mod remote;

// =============================================================================
// Re-exports
// =============================================================================

pub use bridge::SyncBridge;
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use memory::{MemoryRemote, StaticAuth};
pub use remote::{AuthProvider, RemoteStore, SnapshotStream};
