//! # Remote Store Collaborators
//!
//! Trait boundary for the remote document database and the
//! authentication session. The remote is an opaque keyed-record store:
//! per collection it offers a snapshot subscription plus create /
//! update / delete. The concrete client (cloud document service, test
//! double, ...) lives behind these traits.

use std::future::Future;

use tokio::sync::{mpsc, watch};

use tally_core::types::{Budget, Category, Expense};

use crate::error::SyncResult;

// =============================================================================
// Snapshot Stream
// =============================================================================

/// A live subscription delivering full collection snapshots.
///
/// Each item is the remote's complete current collection for the
/// subscribed owner (an initial snapshot arrives on subscribe, then one
/// per remote change). Dropping the stream releases the subscription.
pub struct SnapshotStream<T> {
    rx: mpsc::Receiver<Vec<T>>,
}

impl<T> SnapshotStream<T> {
    /// Wraps a receiver as a snapshot stream.
    pub fn new(rx: mpsc::Receiver<Vec<T>>) -> Self {
        SnapshotStream { rx }
    }

    /// Waits for the next snapshot; None when the remote side closed.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        self.rx.recv().await
    }
}

// =============================================================================
// Remote Store Trait
// =============================================================================

/// The remote keyed-record store, one method set per collection.
///
/// Contract:
/// - `subscribe_*` yields an initial snapshot followed by one snapshot
///   per change; at most one subscription per collection is consumed by
///   the bridge at a time
/// - `create_*` fails with [`SyncError::AlreadyExists`] when the id
///   collides with an existing record
/// - `update_*` replaces the record stored under `id`
/// - `delete_*` is idempotent (deleting a missing id succeeds)
///
/// [`SyncError::AlreadyExists`]: crate::error::SyncError::AlreadyExists
pub trait RemoteStore: Send + Sync + 'static {
    // --- expenses ---------------------------------------------------------
    fn subscribe_expenses(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = SyncResult<SnapshotStream<Expense>>> + Send;
    fn create_expense(&self, expense: &Expense) -> impl Future<Output = SyncResult<()>> + Send;
    fn update_expense(
        &self,
        id: &str,
        expense: &Expense,
    ) -> impl Future<Output = SyncResult<()>> + Send;
    fn delete_expense(&self, id: &str) -> impl Future<Output = SyncResult<()>> + Send;

    // --- categories -------------------------------------------------------
    fn subscribe_categories(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = SyncResult<SnapshotStream<Category>>> + Send;
    fn create_category(&self, category: &Category)
        -> impl Future<Output = SyncResult<()>> + Send;
    fn update_category(
        &self,
        id: &str,
        category: &Category,
    ) -> impl Future<Output = SyncResult<()>> + Send;
    fn delete_category(&self, id: &str) -> impl Future<Output = SyncResult<()>> + Send;

    // --- budgets ----------------------------------------------------------
    fn subscribe_budgets(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = SyncResult<SnapshotStream<Budget>>> + Send;
    fn create_budget(&self, budget: &Budget) -> impl Future<Output = SyncResult<()>> + Send;
    fn update_budget(
        &self,
        id: &str,
        budget: &Budget,
    ) -> impl Future<Output = SyncResult<()>> + Send;
    fn delete_budget(&self, id: &str) -> impl Future<Output = SyncResult<()>> + Send;
}

// =============================================================================
// Auth Provider Trait
// =============================================================================

/// The authentication session collaborator.
pub trait AuthProvider: Send + Sync + 'static {
    /// The currently authenticated user id, if any.
    fn current_user(&self) -> Option<String>;

    /// Subscription to auth-state changes (signed-in user id or None).
    fn watch(&self) -> watch::Receiver<Option<String>>;
}
