//! # Observable Collection Stores
//!
//! One store per entity, each the exclusive owner of its in-memory
//! collection. The collection lives inside a `tokio::sync::watch`
//! channel:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Observable Store Shape                         │
//! │                                                                     │
//! │   add/update/delete ──► watch::Sender::send_modify                 │
//! │                              │                                      │
//! │              ┌───────────────┼──────────────────┐                   │
//! │              ▼               ▼                  ▼                   │
//! │   auto-persist task    derived-view tasks    UI subscribers         │
//! │   (partial save to     (recompute filtered   (re-render)            │
//! │    the local store)     lists, stats, ...)                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations are synchronous: `send_modify` applies the change and wakes
//! every subscriber before returning. Persistence runs in a
//! spawned task, asynchronous relative to the mutation call.

use std::future::Future;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod filters;
pub mod preferences;

pub use budgets::{BudgetPatch, BudgetStore, NewBudget};
pub use categories::{CategoryPatch, CategoryStore, NewCategory};
pub use expenses::{ExpensePatch, ExpenseStore, NewExpense};
pub use filters::{ExpenseFilterStore, FilterState};
pub use preferences::{PreferencesPatch, PreferencesStore};

/// Spawns the auto-persist subscriber for a collection.
///
/// Every change flowing through the store's watch channel triggers the
/// matching partial save. Failed saves are logged and skipped; the
/// in-memory collection stays authoritative (storage-unavailable
/// degradation).
pub(crate) fn spawn_persist<T, F, Fut>(
    label: &'static str,
    mut rx: watch::Receiver<T>,
    save: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let value = rx.borrow_and_update().clone();
            if !save(value).await {
                warn!(collection = label, "Auto-persist failed; keeping in-memory state");
            }
        }
    })
}
