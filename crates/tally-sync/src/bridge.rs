//! # Sync Bridge
//!
//! Reconciles the local collection stores with the remote document
//! store.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │              Unsubscribed ──start(owner)──► Subscribed              │
//! │                                                                     │
//! │  start() cancels and replaces any prior subscription set; at      │
//! │  most one live subscription per collection. stop() releases all    │
//! │  three; no partial-stop state is observable.                        │
//! │                                                                     │
//! │  INBOUND  (per snapshot): content-equality check, then replace     │
//! │           local collection (auto-persists). Categories go through  │
//! │           the seed-overlay merge first.                             │
//! │  OUTBOUND (per local mutation): resolve identity (bounded wait),   │
//! │           validation mirror, create → AlreadyExists → update.      │
//! │           Deletes are best-effort; local deletion is authoritative. │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bridge owns no data. Consistency comes from idempotent merge
//! rules: redundant or repeated snapshot deliveries never duplicate or
//! rewrite local state.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tally_core::types::{Budget, Category, Expense};
use tally_store::seed::default_categories;
use tally_store::stores::{BudgetStore, CategoryStore, ExpenseStore};

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::merge::{categories_differ, collections_differ, merge_categories};
use crate::remote::{AuthProvider, RemoteStore, SnapshotStream};

// =============================================================================
// Subscription Set
// =============================================================================

/// The three live subscription tasks of an active session.
struct SubscriptionSet {
    owner: String,
    expenses: JoinHandle<()>,
    categories: JoinHandle<()>,
    budgets: JoinHandle<()>,
}

impl SubscriptionSet {
    fn abort(&self) {
        self.expenses.abort();
        self.categories.abort();
        self.budgets.abort();
    }
}

// =============================================================================
// Sync Bridge
// =============================================================================

/// Relays between the collection stores and a remote store.
pub struct SyncBridge<R, A> {
    remote: Arc<R>,
    auth: Arc<A>,
    expenses: Arc<ExpenseStore>,
    categories: Arc<CategoryStore>,
    budgets: Arc<BudgetStore>,
    config: SyncConfig,
    active: Mutex<Option<SubscriptionSet>>,
}

impl<R: RemoteStore, A: AuthProvider> SyncBridge<R, A> {
    /// Creates a bridge over the given stores and collaborators.
    pub fn new(
        expenses: Arc<ExpenseStore>,
        categories: Arc<CategoryStore>,
        budgets: Arc<BudgetStore>,
        remote: Arc<R>,
        auth: Arc<A>,
        config: SyncConfig,
    ) -> Self {
        SyncBridge {
            remote,
            auth,
            expenses,
            categories,
            budgets,
            config,
            active: Mutex::new(None),
        }
    }

    /// True while a subscription set is live.
    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Owner of the live subscription set, if any.
    pub async fn active_owner(&self) -> Option<String> {
        self.active.lock().await.as_ref().map(|s| s.owner.clone())
    }

    // =========================================================================
    // Subscription Lifecycle
    // =========================================================================

    /// Starts (or restarts) remote subscriptions for `owner`.
    ///
    /// Any prior subscription set is cancelled first. If establishing
    /// any of the three subscriptions fails, none are left running.
    pub async fn start(&self, owner: &str) -> SyncResult<()> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            info!(owner = %previous.owner, "Replacing existing subscription set");
            previous.abort();
        }

        // Establish all three subscriptions before spawning anything, so
        // a failure leaves no partial set behind.
        let expense_stream = self.remote.subscribe_expenses(owner).await?;
        let category_stream = self.remote.subscribe_categories(owner).await?;
        let budget_stream = self.remote.subscribe_budgets(owner).await?;

        info!(owner, "Remote sync subscribed");
        *active = Some(SubscriptionSet {
            owner: owner.to_string(),
            expenses: tokio::spawn(run_expense_subscription(
                expense_stream,
                self.expenses.clone(),
            )),
            categories: tokio::spawn(run_category_subscription(
                category_stream,
                self.categories.clone(),
                owner.to_string(),
            )),
            budgets: tokio::spawn(run_budget_subscription(budget_stream, self.budgets.clone())),
        });
        Ok(())
    }

    /// Stops remote sync, releasing all three subscriptions.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;
        if let Some(set) = active.take() {
            info!(owner = %set.owner, "Remote sync stopped");
            set.abort();
        }
    }

    // =========================================================================
    // Identity Resolution
    // =========================================================================

    /// Resolves the push identity: the live session user, or the first
    /// signed-in user within the configured wait bound. None means the
    /// operation proceeds as unauthenticated (push is skipped).
    async fn resolve_user(&self) -> Option<String> {
        if let Some(user) = self.auth.current_user() {
            return Some(user);
        }

        let mut rx = self.auth.watch();
        let wait = self.config.auth_wait;
        tokio::time::timeout(wait, async move {
            loop {
                if rx.changed().await.is_err() {
                    return None;
                }
                let user = rx.borrow_and_update().clone();
                if user.is_some() {
                    return user;
                }
            }
        })
        .await
        .ok()
        .flatten()
    }

    // =========================================================================
    // Outbound Push
    // =========================================================================

    /// Pushes an expense to the remote (create, falling back to update
    /// on an id collision).
    ///
    /// Silently skips when unauthenticated or when the record fails the
    /// minimum-field validation mirror. Remote failures other than the
    /// expected collision are logged and surfaced.
    pub async fn push_expense(&self, expense: &Expense) -> SyncResult<()> {
        let Some(user) = self.resolve_user().await else {
            debug!(id = %expense.id, "Not authenticated, skipping expense push");
            return Ok(());
        };

        let mut record = expense.clone();
        if record.user_id != user {
            record.user_id = user;
        }

        if record.amount_cents <= 0
            || record.description.trim().is_empty()
            || record.category_id.trim().is_empty()
        {
            debug!(id = %record.id, "Expense fails minimum validation, skipping push");
            return Ok(());
        }

        match self.remote.create_expense(&record).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(id = %record.id, "Expense exists remotely, updating instead");
                self.remote
                    .update_expense(&record.id, &record)
                    .await
                    .map_err(|e| {
                        error!(id = %record.id, error = %e, "Expense update failed");
                        e
                    })
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "Expense push failed");
                Err(e)
            }
        }
    }

    /// Pushes a category to the remote with create-or-update semantics.
    ///
    /// Seed categories arrive here only after ownership conversion, so
    /// the pushed record always carries the resolved user id.
    pub async fn push_category(&self, category: &Category) -> SyncResult<()> {
        let Some(user) = self.resolve_user().await else {
            debug!(id = %category.id, "Not authenticated, skipping category push");
            return Ok(());
        };

        let mut record = category.clone();
        if record.user_id.as_deref() != Some(user.as_str()) {
            record.user_id = Some(user);
        }

        if record.name.trim().is_empty() {
            debug!(id = %record.id, "Category fails minimum validation, skipping push");
            return Ok(());
        }

        match self.remote.create_category(&record).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(id = %record.id, "Category exists remotely, updating instead");
                self.remote
                    .update_category(&record.id, &record)
                    .await
                    .map_err(|e| {
                        error!(id = %record.id, error = %e, "Category update failed");
                        e
                    })
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "Category push failed");
                Err(e)
            }
        }
    }

    /// Pushes a budget to the remote with create-or-update semantics.
    pub async fn push_budget(&self, budget: &Budget) -> SyncResult<()> {
        let Some(user) = self.resolve_user().await else {
            debug!(id = %budget.id, "Not authenticated, skipping budget push");
            return Ok(());
        };

        let mut record = budget.clone();
        if record.user_id != user {
            record.user_id = user;
        }

        if record.amount_cents <= 0 {
            debug!(id = %record.id, "Budget fails minimum validation, skipping push");
            return Ok(());
        }

        match self.remote.create_budget(&record).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_already_exists() => {
                debug!(id = %record.id, "Budget exists remotely, updating instead");
                self.remote
                    .update_budget(&record.id, &record)
                    .await
                    .map_err(|e| {
                        error!(id = %record.id, error = %e, "Budget update failed");
                        e
                    })
            }
            Err(e) => {
                error!(id = %record.id, error = %e, "Budget push failed");
                Err(e)
            }
        }
    }

    // =========================================================================
    // Outbound Delete (best-effort)
    // =========================================================================

    /// Deletes an expense remotely. Failures are swallowed; the local
    /// deletion already happened and stays authoritative.
    pub async fn delete_expense_remote(&self, id: &str) {
        if self.auth.current_user().is_none() {
            return;
        }
        if let Err(e) = self.remote.delete_expense(id).await {
            debug!(id, error = %e, "Remote expense delete failed (ignored)");
        }
    }

    /// Deletes a category remotely, best-effort.
    pub async fn delete_category_remote(&self, id: &str) {
        if self.auth.current_user().is_none() {
            return;
        }
        if let Err(e) = self.remote.delete_category(id).await {
            debug!(id, error = %e, "Remote category delete failed (ignored)");
        }
    }

    /// Deletes a budget remotely, best-effort.
    pub async fn delete_budget_remote(&self, id: &str) {
        if self.auth.current_user().is_none() {
            return;
        }
        if let Err(e) = self.remote.delete_budget(id).await {
            debug!(id, error = %e, "Remote budget delete failed (ignored)");
        }
    }
}

impl<R, A> Drop for SyncBridge<R, A> {
    fn drop(&mut self) {
        // Mutex::get_mut needs no lock; abort whatever is still running.
        if let Some(set) = self.active.get_mut().take() {
            set.abort();
        }
    }
}

// =============================================================================
// Inbound Subscription Loops
// =============================================================================

async fn run_expense_subscription(mut stream: SnapshotStream<Expense>, store: Arc<ExpenseStore>) {
    while let Some(snapshot) = stream.next().await {
        let local = store.snapshot();
        if collections_differ(&local, &snapshot) {
            info!(count = snapshot.len(), "Applying remote expense snapshot");
            store.replace_all(snapshot);
        } else {
            debug!("Remote expense snapshot matches local state, skipping");
        }
    }
    warn!("Expense subscription closed by remote");
}

async fn run_budget_subscription(mut stream: SnapshotStream<Budget>, store: Arc<BudgetStore>) {
    while let Some(snapshot) = stream.next().await {
        let local = store.snapshot();
        if collections_differ(&local, &snapshot) {
            info!(count = snapshot.len(), "Applying remote budget snapshot");
            store.replace_all(snapshot);
        } else {
            debug!("Remote budget snapshot matches local state, skipping");
        }
    }
    warn!("Budget subscription closed by remote");
}

async fn run_category_subscription(
    mut stream: SnapshotStream<Category>,
    store: Arc<CategoryStore>,
    owner: String,
) {
    let defaults = default_categories();
    // One-shot grace: ignore an empty first snapshot while local user
    // categories exist; they were created before the remote echo and
    // must not be wiped.
    let mut initial_sync = true;

    while let Some(remote) = stream.next().await {
        let local = store.snapshot();

        if initial_sync && remote.is_empty() {
            let has_user_categories = local
                .iter()
                .any(|c| c.user_id.as_deref() == Some(owner.as_str()));
            if has_user_categories {
                debug!("Empty initial category snapshot, keeping local user categories");
                initial_sync = false;
                continue;
            }
        }
        initial_sync = false;

        if categories_differ(&local, &remote, &owner, defaults.len()) {
            let merged = merge_categories(&defaults, &remote);
            info!(
                remote = remote.len(),
                merged = merged.len(),
                "Applying merged category snapshot"
            );
            store.replace_all(merged);
        } else {
            debug!("Remote category snapshot matches local state, skipping");
        }
    }
    warn!("Category subscription closed by remote");
}
