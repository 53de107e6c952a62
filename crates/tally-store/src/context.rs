//! # Application Context
//!
//! The dependency-injection root: one `AppContext` is constructed at
//! startup and passed to consumers. There is no module-level global
//! state; everything reachable from the stores hangs off this object.

use std::sync::Arc;

use tracing::info;

use crate::config::StoreConfig;
use crate::local::LocalStore;
use crate::stores::{
    BudgetStore, CategoryStore, ExpenseFilterStore, ExpenseStore, PreferencesStore,
};
use crate::views::Views;

/// Owns the local store, the observable collection stores, and the
/// derived views.
///
/// ## Usage
/// ```rust,ignore
/// let ctx = AppContext::init(StoreConfig::new(path)).await;
/// let expense = ctx.expenses().add(input, "local");
/// let progress = ctx.views().budget_progress();
/// ```
pub struct AppContext {
    local: LocalStore,
    expenses: Arc<ExpenseStore>,
    categories: Arc<CategoryStore>,
    budgets: Arc<BudgetStore>,
    preferences: Arc<PreferencesStore>,
    filters: Arc<ExpenseFilterStore>,
    views: Views,
}

impl AppContext {
    /// Opens the local store and constructs every collection store and
    /// the derived-view pipeline.
    pub async fn init(config: StoreConfig) -> AppContext {
        let local = LocalStore::open(config).await;

        let expenses = Arc::new(ExpenseStore::new(local.clone()).await);
        let categories = Arc::new(CategoryStore::new(local.clone()).await);
        let budgets = Arc::new(BudgetStore::new(local.clone()).await);
        let preferences = Arc::new(PreferencesStore::new(local.clone()).await);
        let filters = Arc::new(ExpenseFilterStore::new());
        let views = Views::new(&expenses, &budgets, &filters);

        info!(
            expenses = expenses.count(),
            categories = categories.count(),
            budgets = budgets.count(),
            "Application context ready"
        );

        AppContext {
            local,
            expenses,
            categories,
            budgets,
            preferences,
            filters,
            views,
        }
    }

    /// Re-reads every collection from the local store (e.g. after an
    /// import replaced the persisted record).
    pub async fn reload(&self) {
        self.expenses.init().await;
        self.categories.init().await;
        self.budgets.init().await;
        self.preferences.init().await;
    }

    /// The underlying local store.
    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// The expense collection store.
    pub fn expenses(&self) -> &Arc<ExpenseStore> {
        &self.expenses
    }

    /// The category collection store.
    pub fn categories(&self) -> &Arc<CategoryStore> {
        &self.categories
    }

    /// The budget collection store.
    pub fn budgets(&self) -> &Arc<BudgetStore> {
        &self.budgets
    }

    /// The preferences store.
    pub fn preferences(&self) -> &Arc<PreferencesStore> {
        &self.preferences
    }

    /// The expense filter store.
    pub fn filters(&self) -> &Arc<ExpenseFilterStore> {
        &self.filters
    }

    /// The derived views.
    pub fn views(&self) -> &Views {
        &self.views
    }
}
