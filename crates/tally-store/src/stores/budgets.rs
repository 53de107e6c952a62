//! # Budget Store
//!
//! Authoritative in-memory budget collection. A missing start date on
//! add defaults from the budget period anchored to now (start of
//! today/week/month/year).

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use tally_core::budget::default_start_date;
use tally_core::ids::{generate_id, BUDGET_PREFIX};
use tally_core::types::{Budget, BudgetPeriod};

use crate::local::LocalStore;
use crate::stores::spawn_persist;

// =============================================================================
// Input Types
// =============================================================================

/// Fields supplied when creating a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// Category the budget covers; None for the overall budget.
    pub category_id: Option<String>,
    pub amount_cents: i64,
    pub period: BudgetPeriod,
    /// Explicit window start; defaults from `period` when absent.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub category_id: Option<Option<String>>,
    pub amount_cents: Option<i64>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

// =============================================================================
// Budget Store
// =============================================================================

/// Observable store for the budget collection.
pub struct BudgetStore {
    tx: watch::Sender<Vec<Budget>>,
    local: LocalStore,
    persist: JoinHandle<()>,
}

impl BudgetStore {
    /// Creates the store, seeding the collection from the local store and
    /// spawning its auto-persist task.
    pub async fn new(local: LocalStore) -> Self {
        let initial = local.load().await.budgets;
        let (tx, _) = watch::channel(initial);

        let persist_local = local.clone();
        let persist = spawn_persist("budgets", tx.subscribe(), move |budgets: Vec<Budget>| {
            let local = persist_local.clone();
            async move { local.save_budgets(&budgets).await }
        });

        BudgetStore { tx, local, persist }
    }

    /// Re-reads the collection from the local store.
    pub async fn init(&self) {
        let budgets = self.local.load().await.budgets;
        self.tx.send_replace(budgets);
    }

    /// Current collection snapshot.
    pub fn snapshot(&self) -> Vec<Budget> {
        self.tx.borrow().clone()
    }

    /// Subscribes to collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Budget>> {
        self.tx.subscribe()
    }

    /// Number of budgets currently held.
    pub fn count(&self) -> usize {
        self.tx.borrow().len()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a budget and returns it.
    pub fn add(&self, input: NewBudget, user_id: &str) -> Budget {
        let now = Utc::now();
        let budget = Budget {
            id: generate_id(BUDGET_PREFIX),
            user_id: user_id.to_string(),
            category_id: input.category_id,
            amount_cents: input.amount_cents,
            period: input.period,
            start_date: input
                .start_date
                .unwrap_or_else(|| default_start_date(input.period, now)),
            end_date: input.end_date,
            spent_cents: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %budget.id, amount = budget.amount_cents, "Adding budget");
        let created = budget.clone();
        self.tx.send_modify(|budgets| budgets.push(budget));
        created
    }

    /// Applies a partial update. Returns whether the id existed.
    pub fn update(&self, id: &str, patch: BudgetPatch) -> bool {
        let mut found = false;
        self.tx.send_modify(|budgets| {
            if let Some(budget) = budgets.iter_mut().find(|b| b.id == id) {
                found = true;
                if let Some(category_id) = patch.category_id {
                    budget.category_id = category_id;
                }
                if let Some(amount_cents) = patch.amount_cents {
                    budget.amount_cents = amount_cents;
                }
                if let Some(period) = patch.period {
                    budget.period = period;
                }
                if let Some(start_date) = patch.start_date {
                    budget.start_date = start_date;
                }
                if let Some(end_date) = patch.end_date {
                    budget.end_date = end_date;
                }
                budget.updated_at = Utc::now();
            }
        });
        found
    }

    /// Deletes a budget. Returns whether the id existed.
    pub fn delete(&self, id: &str) -> bool {
        let mut found = false;
        self.tx.send_modify(|budgets| {
            let before = budgets.len();
            budgets.retain(|b| b.id != id);
            found = budgets.len() != before;
        });
        found
    }

    /// Looks up a budget by id.
    pub fn get_by_id(&self, id: &str) -> Option<Budget> {
        self.tx.borrow().iter().find(|b| b.id == id).cloned()
    }

    /// Looks up the first budget for a category (None = overall budget).
    pub fn get_by_category(&self, category_id: Option<&str>) -> Option<Budget> {
        self.tx
            .borrow()
            .iter()
            .find(|b| b.category_id.as_deref() == category_id)
            .cloned()
    }

    /// Removes every budget.
    pub fn clear(&self) {
        self.tx.send_replace(Vec::new());
    }

    /// Replaces the whole collection (import / remote merge).
    pub fn replace_all(&self, budgets: Vec<Budget>) {
        self.tx.send_replace(budgets);
    }
}

impl Drop for BudgetStore {
    fn drop(&mut self) {
        self.persist.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use tally_core::dates::start_of_month;

    async fn store() -> BudgetStore {
        BudgetStore::new(LocalStore::open(StoreConfig::in_memory()).await).await
    }

    fn monthly(category_id: Option<&str>, cents: i64) -> NewBudget {
        NewBudget {
            category_id: category_id.map(str::to_string),
            amount_cents: cents,
            period: BudgetPeriod::Monthly,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_add_defaults_start_date_from_period() {
        let store = store().await;
        let budget = store.add(monthly(Some("cat_food"), 30_000), "local");

        assert!(budget.id.starts_with("bgt_"));
        assert_eq!(budget.start_date, start_of_month(Utc::now()));
        assert_eq!(budget.spent_cents, 0);
    }

    #[tokio::test]
    async fn test_explicit_start_date_respected() {
        let store = store().await;
        let start = Utc::now() - chrono::Duration::days(90);
        let budget = store.add(
            NewBudget {
                start_date: Some(start),
                ..monthly(None, 100_000)
            },
            "local",
        );
        assert_eq!(budget.start_date, start);
    }

    #[tokio::test]
    async fn test_overall_budget_lookup() {
        let store = store().await;
        store.add(monthly(Some("cat_food"), 30_000), "local");
        let overall = store.add(monthly(None, 300_000), "local");

        assert_eq!(store.get_by_category(None).map(|b| b.id), Some(overall.id));
        assert!(store.get_by_category(Some("cat_food")).is_some());
        assert!(store.get_by_category(Some("cat_missing")).is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = store().await;
        let budget = store.add(monthly(Some("cat_food"), 30_000), "local");

        assert!(store.update(
            &budget.id,
            BudgetPatch {
                amount_cents: Some(45_000),
                category_id: Some(None),
                ..BudgetPatch::default()
            },
        ));
        let updated = store.get_by_id(&budget.id).expect("present");
        assert_eq!(updated.amount_cents, 45_000);
        assert!(updated.is_overall());

        assert!(store.delete(&budget.id));
        assert!(!store.delete(&budget.id));
        assert!(!store.update(&budget.id, BudgetPatch::default()));
    }
}
