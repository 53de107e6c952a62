//! # In-Memory Remote Store
//!
//! A [`RemoteStore`]/[`AuthProvider`] pair backed by process memory,
//! used by the test suite and local demos. Faithful to the remote
//! contract: snapshot-on-subscribe, AlreadyExists on id collision,
//! idempotent deletes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tokio::sync::{mpsc, watch};

use tally_core::types::{Budget, Category, Expense};

use crate::error::{SyncError, SyncResult};
use crate::remote::{AuthProvider, RemoteStore, SnapshotStream};

/// Snapshot channel capacity for memory subscriptions.
const CHANNEL_CAPACITY: usize = 32;

// =============================================================================
// Keyed Records
// =============================================================================

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Expense {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Category {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Budget {
    fn key(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// One Collection
// =============================================================================

struct Collection<T> {
    entity_type: &'static str,
    records: Mutex<BTreeMap<String, T>>,
    subscribers: Mutex<Vec<mpsc::Sender<Vec<T>>>>,
}

impl<T: Keyed + Clone> Collection<T> {
    fn new(entity_type: &'static str) -> Self {
        Collection {
            entity_type,
            records: Mutex::new(BTreeMap::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.records
            .lock()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Pushes the current snapshot to every live subscriber.
    fn broadcast(&self) {
        let snapshot = self.snapshot();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.try_send(snapshot.clone()).is_ok());
        }
    }

    fn subscribe(&self) -> SnapshotStream<T> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        // Initial snapshot arrives immediately, like a document store's
        // first listener callback.
        let _ = tx.try_send(self.snapshot());
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        SnapshotStream::new(rx)
    }

    fn create(&self, record: T) -> SyncResult<()> {
        {
            let mut records = self
                .records
                .lock()
                .map_err(|_| SyncError::Unavailable("lock poisoned".into()))?;
            if records.contains_key(record.key()) {
                return Err(SyncError::already_exists(self.entity_type, record.key()));
            }
            records.insert(record.key().to_string(), record);
        }
        self.broadcast();
        Ok(())
    }

    fn update(&self, id: &str, record: T) -> SyncResult<()> {
        {
            let mut records = self
                .records
                .lock()
                .map_err(|_| SyncError::Unavailable("lock poisoned".into()))?;
            if !records.contains_key(id) {
                return Err(SyncError::not_found(self.entity_type, id));
            }
            records.insert(id.to_string(), record);
        }
        self.broadcast();
        Ok(())
    }

    fn delete(&self, id: &str) -> SyncResult<()> {
        if let Ok(mut records) = self.records.lock() {
            records.remove(id);
        }
        self.broadcast();
        Ok(())
    }

    /// Replaces the stored records and broadcasts (test hook).
    fn set(&self, items: Vec<T>) {
        if let Ok(mut records) = self.records.lock() {
            *records = items
                .into_iter()
                .map(|item| (item.key().to_string(), item))
                .collect();
        }
        self.broadcast();
    }
}

// =============================================================================
// Memory Remote
// =============================================================================

/// In-memory remote document store.
pub struct MemoryRemote {
    expenses: Collection<Expense>,
    categories: Collection<Category>,
    budgets: Collection<Budget>,
    /// When set, create/update calls fail with `Unavailable`.
    reject_writes: AtomicBool,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        MemoryRemote {
            expenses: Collection::new("expense"),
            categories: Collection::new("category"),
            budgets: Collection::new("budget"),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent create/update fail with `Unavailable`
    /// (simulates a network outage). Deletes still succeed.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writes(&self) -> SyncResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(SyncError::Unavailable("writes rejected".into()))
        } else {
            Ok(())
        }
    }

    // --- test hooks -------------------------------------------------------

    /// Current remote expense records.
    pub fn expense_records(&self) -> Vec<Expense> {
        self.expenses.snapshot()
    }

    /// Current remote category records.
    pub fn category_records(&self) -> Vec<Category> {
        self.categories.snapshot()
    }

    /// Current remote budget records.
    pub fn budget_records(&self) -> Vec<Budget> {
        self.budgets.snapshot()
    }

    /// Replaces the remote expense set and notifies subscribers.
    pub fn set_expenses(&self, expenses: Vec<Expense>) {
        self.expenses.set(expenses);
    }

    /// Replaces the remote category set and notifies subscribers.
    pub fn set_categories(&self, categories: Vec<Category>) {
        self.categories.set(categories);
    }

    /// Replaces the remote budget set and notifies subscribers.
    pub fn set_budgets(&self, budgets: Vec<Budget>) {
        self.budgets.set(budgets);
    }
}

impl RemoteStore for MemoryRemote {
    async fn subscribe_expenses(&self, _owner_id: &str) -> SyncResult<SnapshotStream<Expense>> {
        Ok(self.expenses.subscribe())
    }

    async fn create_expense(&self, expense: &Expense) -> SyncResult<()> {
        self.check_writes()?;
        self.expenses.create(expense.clone())
    }

    async fn update_expense(&self, id: &str, expense: &Expense) -> SyncResult<()> {
        self.check_writes()?;
        self.expenses.update(id, expense.clone())
    }

    async fn delete_expense(&self, id: &str) -> SyncResult<()> {
        self.expenses.delete(id)
    }

    async fn subscribe_categories(&self, _owner_id: &str) -> SyncResult<SnapshotStream<Category>> {
        Ok(self.categories.subscribe())
    }

    async fn create_category(&self, category: &Category) -> SyncResult<()> {
        self.check_writes()?;
        self.categories.create(category.clone())
    }

    async fn update_category(&self, id: &str, category: &Category) -> SyncResult<()> {
        self.check_writes()?;
        self.categories.update(id, category.clone())
    }

    async fn delete_category(&self, id: &str) -> SyncResult<()> {
        self.categories.delete(id)
    }

    async fn subscribe_budgets(&self, _owner_id: &str) -> SyncResult<SnapshotStream<Budget>> {
        Ok(self.budgets.subscribe())
    }

    async fn create_budget(&self, budget: &Budget) -> SyncResult<()> {
        self.check_writes()?;
        self.budgets.create(budget.clone())
    }

    async fn update_budget(&self, id: &str, budget: &Budget) -> SyncResult<()> {
        self.check_writes()?;
        self.budgets.update(id, budget.clone())
    }

    async fn delete_budget(&self, id: &str) -> SyncResult<()> {
        self.budgets.delete(id)
    }
}

// =============================================================================
// Static Auth
// =============================================================================

/// [`AuthProvider`] double with a controllable session.
pub struct StaticAuth {
    tx: watch::Sender<Option<String>>,
}

impl StaticAuth {
    /// Starts with the given session state.
    pub fn new(user: Option<String>) -> Self {
        let (tx, _) = watch::channel(user);
        StaticAuth { tx }
    }

    /// Convenience: an authenticated session.
    pub fn signed_in(user: &str) -> Self {
        Self::new(Some(user.to_string()))
    }

    /// Convenience: no session.
    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// Transitions to an authenticated session.
    pub fn sign_in(&self, user: &str) {
        self.tx.send_replace(Some(user.to_string()));
    }

    /// Ends the session.
    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl AuthProvider for StaticAuth {
    fn current_user(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn expense(id: &str) -> Expense {
        Expense {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            amount_cents: 1000,
            description: "test".to_string(),
            category_id: "cat_food".to_string(),
            date: Utc::now().date_naive(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            merchant: None,
            payment_method: None,
            notes: None,
            tags: None,
        }
    }

    #[tokio::test]
    async fn test_create_collision_signals_already_exists() {
        let remote = MemoryRemote::new();
        remote.create_expense(&expense("exp_1")).await.expect("first create");

        let err = remote
            .create_expense(&expense("exp_1"))
            .await
            .expect_err("collision");
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_update_missing_fails_but_delete_is_idempotent() {
        let remote = MemoryRemote::new();
        assert!(remote
            .update_expense("exp_nope", &expense("exp_nope"))
            .await
            .is_err());
        assert!(remote.delete_expense("exp_nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_change_snapshots() {
        let remote = MemoryRemote::new();
        remote.create_expense(&expense("exp_1")).await.expect("create");

        let mut stream = remote.subscribe_expenses("user-1").await.expect("subscribe");
        let initial = stream.next().await.expect("initial snapshot");
        assert_eq!(initial.len(), 1);

        remote.create_expense(&expense("exp_2")).await.expect("create");
        let updated = stream.next().await.expect("change snapshot");
        assert_eq!(updated.len(), 2);
    }

    #[tokio::test]
    async fn test_reject_writes_flag() {
        let remote = MemoryRemote::new();
        remote.reject_writes(true);
        assert!(remote.create_expense(&expense("exp_1")).await.is_err());
        remote.reject_writes(false);
        assert!(remote.create_expense(&expense("exp_1")).await.is_ok());
    }

    #[test]
    fn test_static_auth_transitions() {
        let auth = StaticAuth::signed_out();
        assert_eq!(auth.current_user(), None);

        let mut rx = auth.watch();
        auth.sign_in("user-1");
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(auth.current_user().as_deref(), Some("user-1"));

        auth.sign_out();
        assert_eq!(auth.current_user(), None);
    }
}
