//! # Budget Calculations
//!
//! Progress math for budgets: how much of a budget's window has been
//! spent, how much remains, and which traffic-light status applies.
//!
//! ## Status Thresholds
//! ```text
//! percentage:   0 ──────────── 80 ─────────── 100 ──────▶
//! status:           safe          warning        danger
//! ```
//! Thresholds are fixed constants; percentage is clamped to 100.

use chrono::{DateTime, Utc};

use crate::dates::{start_of_day, start_of_month, start_of_week, start_of_year};
use crate::filter::filter_by_date_range;
use crate::money::Money;
use crate::stats::calculate_total;
use crate::types::{Budget, BudgetPeriod, BudgetProgress, BudgetStatus, Expense};

/// Percentage at or above which a budget is flagged `warning`.
pub const WARNING_THRESHOLD: f64 = 80.0;

/// Percentage at or above which a budget is flagged `danger`.
pub const DANGER_THRESHOLD: f64 = 100.0;

/// Computes progress for a budget given the spent amount.
///
/// - `remaining` never goes negative (clamped at zero)
/// - `percentage` is clamped to 100; a zero-amount budget reports 0%
///   regardless of spend (avoids a meaningless division)
/// - `status` is danger at ≥100%, warning at ≥80%, safe otherwise
///
/// ## Example
/// ```rust
/// use tally_core::budget::calculate_budget_progress;
/// use tally_core::money::Money;
/// # use tally_core::types::{Budget, BudgetPeriod, BudgetStatus};
/// # use chrono::Utc;
/// # let budget = Budget {
/// #     id: "bgt_x".into(), user_id: "local".into(), category_id: None,
/// #     amount_cents: 10_000, period: BudgetPeriod::Monthly,
/// #     start_date: Utc::now(), end_date: None, spent_cents: 0,
/// #     created_at: Utc::now(), updated_at: Utc::now(),
/// # };
/// let progress = calculate_budget_progress(&budget, Money::from_cents(8_000));
/// assert_eq!(progress.status, BudgetStatus::Warning);
/// assert_eq!(progress.remaining, Money::from_cents(2_000));
/// ```
pub fn calculate_budget_progress(budget: &Budget, spent: Money) -> BudgetProgress {
    let amount = budget.amount();
    let raw_percentage = if amount.is_positive() {
        spent.cents() as f64 / amount.cents() as f64 * 100.0
    } else {
        0.0
    };

    let status = if raw_percentage >= DANGER_THRESHOLD {
        BudgetStatus::Danger
    } else if raw_percentage >= WARNING_THRESHOLD {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Safe
    };

    BudgetProgress {
        budget: budget.clone(),
        spent,
        remaining: amount.remaining_after(spent),
        percentage: raw_percentage.min(100.0),
        status,
    }
}

/// Sums the expenses that count against a budget.
///
/// An expense counts when its date falls inside
/// `[budget.start_date, budget.end_date or now]` (day granularity) and,
/// for category budgets, when it belongs to that category. Overall
/// budgets (`category_id = None`) match every category.
pub fn spent_for_budget(budget: &Budget, expenses: &[Expense], now: DateTime<Utc>) -> Money {
    let end = budget.end_date.unwrap_or(now);
    let mut in_range = filter_by_date_range(expenses, budget.start_date, end);
    if let Some(category_id) = &budget.category_id {
        in_range.retain(|exp| &exp.category_id == category_id);
    }
    calculate_total(&in_range)
}

/// Computes progress for every budget in one pass over the expense set.
pub fn budget_progress_list(
    budgets: &[Budget],
    expenses: &[Expense],
    now: DateTime<Utc>,
) -> Vec<BudgetProgress> {
    budgets
        .iter()
        .map(|budget| calculate_budget_progress(budget, spent_for_budget(budget, expenses, now)))
        .collect()
}

/// Keeps only budgets at warning or danger status.
pub fn budget_alerts(progress: &[BudgetProgress]) -> Vec<BudgetProgress> {
    progress
        .iter()
        .filter(|p| matches!(p.status, BudgetStatus::Warning | BudgetStatus::Danger))
        .cloned()
        .collect()
}

/// Default start of a budget window for a period, anchored to `now`:
/// start of today / this week / this month / this year.
pub fn default_start_date(period: BudgetPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        BudgetPeriod::Daily => start_of_day(now),
        BudgetPeriod::Weekly => start_of_week(now),
        BudgetPeriod::Monthly => start_of_month(now),
        BudgetPeriod::Yearly => start_of_year(now),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
