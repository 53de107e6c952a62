//! # Expense Statistics
//!
//! Pure aggregation over expense collections. Defensive by design: empty
//! input yields zeroed results, unknown categories resolve to a neutral
//! placeholder, and nothing here can fail.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::money::Money;
use crate::types::{Category, CategoryStats, Expense, ExpenseStats};

/// Name reported for expenses whose category no longer exists.
const UNKNOWN_CATEGORY_NAME: &str = "Unknown";

/// Neutral gray used for unknown categories in charts.
const UNKNOWN_CATEGORY_COLOR: &str = "#64748B";

/// Sums the amounts of a set of expenses.
pub fn calculate_total(expenses: &[Expense]) -> Money {
    expenses.iter().map(Expense::amount).sum()
}

/// Computes aggregate statistics for a set of expenses.
///
/// The empty set yields the all-zero stats value (not an error), so the
/// dashboard can render before any expense exists.
///
/// ## Example
/// ```rust
/// use tally_core::stats::calculate_stats;
///
/// let stats = calculate_stats(&[]);
/// assert_eq!(stats.count, 0);
/// assert!(stats.total.is_zero());
/// ```
pub fn calculate_stats(expenses: &[Expense]) -> ExpenseStats {
    if expenses.is_empty() {
        return ExpenseStats::default();
    }

    let total = calculate_total(expenses);
    let count = expenses.len();
    let mut highest = Money::from_cents(i64::MIN);
    let mut lowest = Money::from_cents(i64::MAX);
    for expense in expenses {
        let amount = expense.amount();
        if amount > highest {
            highest = amount;
        }
        if amount < lowest {
            lowest = amount;
        }
    }

    ExpenseStats {
        total,
        count,
        average: total.divided_by(count as i64),
        highest,
        lowest,
    }
}

/// Computes per-category totals, counts, and shares of the grand total.
///
/// Category names and colors are resolved against the given category
/// list; expenses pointing at a missing category fall back to
/// `"Unknown"` / neutral gray. The result is ordered by descending total.
pub fn calculate_category_stats(
    expenses: &[Expense],
    categories: &[Category],
) -> Vec<CategoryStats> {
    let grand_total = calculate_total(expenses);

    // BTreeMap keeps the pre-sort order deterministic.
    let mut sums: BTreeMap<&str, (Money, usize)> = BTreeMap::new();
    for expense in expenses {
        let entry = sums
            .entry(expense.category_id.as_str())
            .or_insert((Money::zero(), 0));
        entry.0 += expense.amount();
        entry.1 += 1;
    }

    let mut stats: Vec<CategoryStats> = sums
        .into_iter()
        .map(|(category_id, (total, count))| {
            let category = categories.iter().find(|c| c.id == category_id);
            let percentage = if grand_total.is_positive() {
                total.cents() as f64 / grand_total.cents() as f64 * 100.0
            } else {
                0.0
            };
            CategoryStats {
                category_id: category_id.to_string(),
                category_name: category
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY_NAME.to_string()),
                total,
                count,
                percentage,
                color: category
                    .map(|c| c.color.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY_COLOR.to_string()),
            }
        })
        .collect();

    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}

/// Groups expenses by calendar date (insertion order within a day kept).
pub fn group_by_date(expenses: &[Expense]) -> BTreeMap<NaiveDate, Vec<Expense>> {
    let mut groups: BTreeMap<NaiveDate, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        groups.entry(expense.date).or_default().push(expense.clone());
    }
    groups
}

/// Groups expenses by category id.
pub fn group_by_category(expenses: &[Expense]) -> BTreeMap<String, Vec<Expense>> {
    let mut groups: BTreeMap<String, Vec<Expense>> = BTreeMap::new();
    for expense in expenses {
        groups
            .entry(expense.category_id.clone())
            .or_default()
            .push(expense.clone());
    }
    groups
}

// =============================================================================
// Unit Tests
// =============================================================================
