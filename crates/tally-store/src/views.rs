//! # Derived Views
//!
//! Reactive projections over the collection stores.
//!
//! ## Recompute Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   inputs (watch)              view tasks              outputs       │
//! │                                                                     │
//! │   ExpenseStore ──┬──► [expense view task] ──► filtered list         │
//! │                  │                       ├──► today / week / month  │
//! │   FilterStore ───┘                       │      subsets + stats     │
//! │                                                                     │
//! │   BudgetStore ───┬──► [budget view task] ──► budget progress        │
//! │   ExpenseStore ──┘                       └──► alerts                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each view task waits on its input channels and re-runs the pure
//! derivation from tally-core when any input changes. Outputs go through
//! `send_if_modified`, so downstream subscribers only wake when the
//! derived value actually changed (memoized recomputation, not polling).
//! A recompute is synchronous within the task wakeup; a subscriber can
//! never observe a torn intermediate state through a watch borrow.

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use tally_core::budget::{budget_alerts, budget_progress_list};
use tally_core::filter::{apply_filters, month_expenses, today_expenses, week_expenses};
use tally_core::stats::calculate_stats;
use tally_core::types::{Budget, BudgetProgress, Expense, ExpenseStats};

use crate::stores::{BudgetStore, ExpenseFilterStore, ExpenseStore, FilterState};

// =============================================================================
// View Types
// =============================================================================

/// A period subset of expenses together with its statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodView {
    pub expenses: Vec<Expense>,
    pub stats: ExpenseStats,
}

fn period_view(expenses: Vec<Expense>) -> PeriodView {
    let stats = calculate_stats(&expenses);
    PeriodView { expenses, stats }
}

fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    });
}

// =============================================================================
// Views
// =============================================================================

/// Handle to every derived view. Constructed once per
/// [`AppContext`](crate::context::AppContext); dropping it stops the
/// recompute tasks.
pub struct Views {
    filtered_rx: watch::Receiver<Vec<Expense>>,
    today_rx: watch::Receiver<PeriodView>,
    week_rx: watch::Receiver<PeriodView>,
    month_rx: watch::Receiver<PeriodView>,
    progress_rx: watch::Receiver<Vec<BudgetProgress>>,
    alerts_rx: watch::Receiver<Vec<BudgetProgress>>,
    tasks: Vec<JoinHandle<()>>,
}

impl Views {
    /// Wires the view pipeline onto the given stores.
    pub fn new(
        expenses: &ExpenseStore,
        budgets: &BudgetStore,
        filters: &ExpenseFilterStore,
    ) -> Self {
        let mut tasks = Vec::new();

        // ---------------------------------------------------------------------
        // Expense views: filtered list + period subsets
        // ---------------------------------------------------------------------
        let mut expense_rx = expenses.subscribe();
        let mut filter_rx = filters.subscribe();

        let now = Utc::now();
        let initial_expenses = expense_rx.borrow_and_update().clone();
        let initial_state = filter_rx.borrow_and_update().clone();

        let (filtered_tx, filtered_rx) = watch::channel(apply_filters(
            &initial_expenses,
            &initial_state.filters,
            &initial_state.sort,
            now,
        ));
        let (today_tx, today_rx) =
            watch::channel(period_view(today_expenses(&initial_expenses, now)));
        let (week_tx, week_rx) =
            watch::channel(period_view(week_expenses(&initial_expenses, now)));
        let (month_tx, month_rx) =
            watch::channel(period_view(month_expenses(&initial_expenses, now)));

        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = expense_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = filter_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let expenses: Vec<Expense> = expense_rx.borrow_and_update().clone();
                let state: FilterState = filter_rx.borrow_and_update().clone();
                let now = Utc::now();

                publish(
                    &filtered_tx,
                    apply_filters(&expenses, &state.filters, &state.sort, now),
                );
                publish(&today_tx, period_view(today_expenses(&expenses, now)));
                publish(&week_tx, period_view(week_expenses(&expenses, now)));
                publish(&month_tx, period_view(month_expenses(&expenses, now)));
            }
        }));

        // ---------------------------------------------------------------------
        // Budget views: progress list + alerts
        // ---------------------------------------------------------------------
        let mut budget_rx = budgets.subscribe();
        let mut expense_rx = expenses.subscribe();

        let now = Utc::now();
        let initial_budgets = budget_rx.borrow_and_update().clone();
        let initial_expenses = expense_rx.borrow_and_update().clone();
        let initial_progress = budget_progress_list(&initial_budgets, &initial_expenses, now);

        let (alerts_tx, alerts_rx) = watch::channel(budget_alerts(&initial_progress));
        let (progress_tx, progress_rx) = watch::channel(initial_progress);

        tasks.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = budget_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    changed = expense_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }

                let budgets: Vec<Budget> = budget_rx.borrow_and_update().clone();
                let expenses: Vec<Expense> = expense_rx.borrow_and_update().clone();
                let progress = budget_progress_list(&budgets, &expenses, Utc::now());

                publish(&alerts_tx, budget_alerts(&progress));
                publish(&progress_tx, progress);
            }
        }));

        Views {
            filtered_rx,
            today_rx,
            week_rx,
            month_rx,
            progress_rx,
            alerts_rx,
            tasks,
        }
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Current filtered + sorted expense list.
    pub fn filtered(&self) -> Vec<Expense> {
        self.filtered_rx.borrow().clone()
    }

    /// Today's expenses and stats.
    pub fn today(&self) -> PeriodView {
        self.today_rx.borrow().clone()
    }

    /// This week's expenses and stats.
    pub fn week(&self) -> PeriodView {
        self.week_rx.borrow().clone()
    }

    /// This month's expenses and stats.
    pub fn month(&self) -> PeriodView {
        self.month_rx.borrow().clone()
    }

    /// Progress for every budget.
    pub fn budget_progress(&self) -> Vec<BudgetProgress> {
        self.progress_rx.borrow().clone()
    }

    /// Budgets at warning or danger status.
    pub fn alerts(&self) -> Vec<BudgetProgress> {
        self.alerts_rx.borrow().clone()
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Watches the filtered expense list.
    pub fn watch_filtered(&self) -> watch::Receiver<Vec<Expense>> {
        self.filtered_rx.clone()
    }

    /// Watches today's period view.
    pub fn watch_today(&self) -> watch::Receiver<PeriodView> {
        self.today_rx.clone()
    }

    /// Watches this week's period view.
    pub fn watch_week(&self) -> watch::Receiver<PeriodView> {
        self.week_rx.clone()
    }

    /// Watches this month's period view.
    pub fn watch_month(&self) -> watch::Receiver<PeriodView> {
        self.month_rx.clone()
    }

    /// Watches the budget progress list.
    pub fn watch_budget_progress(&self) -> watch::Receiver<Vec<BudgetProgress>> {
        self.progress_rx.clone()
    }

    /// Watches the alert list.
    pub fn watch_alerts(&self) -> watch::Receiver<Vec<BudgetProgress>> {
        self.alerts_rx.clone()
    }
}

impl Drop for Views {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::local::LocalStore;
    use crate::stores::{NewBudget, NewExpense};
    use std::time::Duration;
    use tally_core::types::{BudgetPeriod, BudgetStatus, SortDirection, SortField};

    async fn setup() -> (ExpenseStore, BudgetStore, ExpenseFilterStore, Views) {
        let local = LocalStore::open(StoreConfig::in_memory()).await;
        let expenses = ExpenseStore::new(local.clone()).await;
        let budgets = BudgetStore::new(local.clone()).await;
        let filters = ExpenseFilterStore::new();
        let views = Views::new(&expenses, &budgets, &filters);
        (expenses, budgets, filters, views)
    }

    async fn await_change<T: Clone + Send + Sync>(rx: &mut watch::Receiver<T>) {
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("view recompute timed out")
            .expect("view sender dropped");
    }

    fn expense(description: &str, cents: i64, category: &str) -> NewExpense {
        NewExpense {
            amount_cents: cents,
            description: description.to_string(),
            category_id: category.to_string(),
            ..NewExpense::default()
        }
    }

    #[tokio::test]
    async fn test_filtered_view_recomputes_on_mutation() {
        let (expenses, _budgets, _filters, views) = setup().await;
        let mut rx = views.watch_filtered();

        expenses.add(expense("Lunch", 5_000, "cat_food"), "local");
        await_change(&mut rx).await;

        let filtered = views.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].description, "Lunch");
    }

    #[tokio::test]
    async fn test_filtered_view_recomputes_on_filter_change() {
        let (expenses, _budgets, filters, views) = setup().await;
        let mut rx = views.watch_filtered();

        expenses.add(expense("Coffee", 400, "cat_food"), "local");
        await_change(&mut rx).await;
        expenses.add(expense("Train ticket", 2_500, "cat_travel"), "local");
        await_change(&mut rx).await;
        assert_eq!(views.filtered().len(), 2);

        filters.set_category(Some("cat_travel".to_string()));
        await_change(&mut rx).await;
        let filtered = views.filtered();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].description, "Train ticket");

        filters.set_sort(SortField::Amount, SortDirection::Asc);
        filters.clear_filters();
        await_change(&mut rx).await;
        assert_eq!(views.filtered().len(), 2);
    }

    #[tokio::test]
    async fn test_period_views_track_today() {
        let (expenses, _budgets, _filters, views) = setup().await;
        let mut today_rx = views.watch_today();
        let mut week_rx = views.watch_week();
        let mut month_rx = views.watch_month();

        expenses.add(expense("Lunch", 5_000, "cat_food"), "local");
        await_change(&mut today_rx).await;
        await_change(&mut week_rx).await;
        await_change(&mut month_rx).await;

        let today = views.today();
        assert_eq!(today.expenses.len(), 1);
        assert_eq!(today.stats.total.cents(), 5_000);
        assert_eq!(today.stats.count, 1);

        // Today ⊆ week ⊆ month.
        assert_eq!(views.week().stats.total.cents(), 5_000);
        assert_eq!(views.month().stats.total.cents(), 5_000);
    }

    #[tokio::test]
    async fn test_budget_progress_and_alerts() {
        let (expenses, budgets, _filters, views) = setup().await;
        let mut rx = views.watch_budget_progress();

        budgets.add(
            NewBudget {
                category_id: Some("cat_food".to_string()),
                amount_cents: 10_000,
                period: BudgetPeriod::Monthly,
                start_date: None,
                end_date: None,
            },
            "local",
        );
        await_change(&mut rx).await;
        assert_eq!(views.budget_progress().len(), 1);
        assert_eq!(views.alerts().len(), 0);

        // 60 + 50 on a 100 budget: clamped to 100%, danger, in alerts.
        expenses.add(expense("Dinner", 6_000, "cat_food"), "local");
        await_change(&mut rx).await;
        expenses.add(expense("Brunch", 5_000, "cat_food"), "local");
        await_change(&mut rx).await;

        let progress = views.budget_progress();
        assert_eq!(progress[0].spent.cents(), 11_000);
        assert_eq!(progress[0].percentage, 100.0);
        assert_eq!(progress[0].status, BudgetStatus::Danger);
        assert!(progress[0].remaining.is_zero());

        let alerts = views.alerts();
        assert_eq!(alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_changes_do_not_wake_memoized_views() {
        let (expenses, _budgets, _filters, views) = setup().await;
        let mut filtered_rx = views.watch_filtered();
        let mut alerts_rx = views.watch_alerts();

        expenses.add(expense("Lunch", 5_000, "cat_food"), "local");
        await_change(&mut filtered_rx).await;

        // No budgets exist, so the alert list stays empty and its
        // subscribers never wake.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!alerts_rx.has_changed().expect("sender alive"));
    }
}
