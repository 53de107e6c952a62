//! # Search, Sort & Filter
//!
//! Pure predicates and transformations used by the expense list view and
//! the period subsets. All functions take collections by reference and
//! return fresh vectors; none of them can fail.

use chrono::{DateTime, Utc};

use crate::dates::{start_of_month, start_of_week};
use crate::types::{Expense, ExpenseFilters, ExpenseSort, SortDirection, SortField};

// =============================================================================
// Search
// =============================================================================

/// Case-insensitive substring search across description, merchant, notes,
/// and tags. A blank or whitespace-only query returns the input unchanged.
pub fn search_expenses(expenses: &[Expense], query: &str) -> Vec<Expense> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return expenses.to_vec();
    }

    expenses
        .iter()
        .filter(|exp| {
            exp.description.to_lowercase().contains(&needle)
                || exp
                    .merchant
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(&needle))
                || exp
                    .notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
                || exp
                    .tags
                    .as_deref()
                    .is_some_and(|tags| tags.iter().any(|t| t.to_lowercase().contains(&needle)))
        })
        .cloned()
        .collect()
}

// =============================================================================
// Sorting
// =============================================================================

/// Stable sort by the given field and direction.
///
/// Date and amount compare numerically; description compares
/// case-insensitively. `Desc` reverses the comparator.
pub fn sort_expenses(
    mut expenses: Vec<Expense>,
    field: SortField,
    direction: SortDirection,
) -> Vec<Expense> {
    expenses.sort_by(|a, b| {
        let ordering = match field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Amount => a.amount_cents.cmp(&b.amount_cents),
            SortField::Description => a
                .description
                .to_lowercase()
                .cmp(&b.description.to_lowercase()),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    expenses
}

// =============================================================================
// Date-Range Filtering
// =============================================================================

/// Keeps expenses whose date falls inside `[start, end]`, inclusive on
/// both ends at day granularity: `start` is truncated to the beginning of
/// its day and `end` extended to the end of its day regardless of the
/// precision of the inputs.
pub fn filter_by_date_range(
    expenses: &[Expense],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Expense> {
    let first = start.date_naive();
    let last = end.date_naive();
    expenses
        .iter()
        .filter(|exp| exp.date >= first && exp.date <= last)
        .cloned()
        .collect()
}

/// Expenses dated today.
pub fn today_expenses(expenses: &[Expense], now: DateTime<Utc>) -> Vec<Expense> {
    filter_by_date_range(expenses, now, now)
}

/// Expenses from the start of the current week (Sunday) through now.
pub fn week_expenses(expenses: &[Expense], now: DateTime<Utc>) -> Vec<Expense> {
    filter_by_date_range(expenses, start_of_week(now), now)
}

/// Expenses from the start of the current month through now.
pub fn month_expenses(expenses: &[Expense], now: DateTime<Utc>) -> Vec<Expense> {
    filter_by_date_range(expenses, start_of_month(now), now)
}

// =============================================================================
// Combined Filter Pipeline
// =============================================================================

/// Applies the full list-view pipeline: search, then category, date
/// range, amount range, and payment-method narrowing, then sort.
///
/// This is the pure body of the reactive "filtered expenses" view; the
/// store layer re-runs it whenever expenses or filters change.
pub fn apply_filters(
    expenses: &[Expense],
    filters: &ExpenseFilters,
    sort: &ExpenseSort,
    now: DateTime<Utc>,
) -> Vec<Expense> {
    let mut result = match filters.search.as_deref() {
        Some(query) => search_expenses(expenses, query),
        None => expenses.to_vec(),
    };

    if let Some(category_id) = &filters.category_id {
        result.retain(|exp| &exp.category_id == category_id);
    }

    if filters.date_from.is_some() || filters.date_to.is_some() {
        let first = filters
            .date_from
            .unwrap_or(chrono::NaiveDate::MIN);
        let last = filters.date_to.unwrap_or_else(|| now.date_naive());
        result.retain(|exp| exp.date >= first && exp.date <= last);
    }

    if let Some(min) = filters.amount_min_cents {
        result.retain(|exp| exp.amount_cents >= min);
    }
    if let Some(max) = filters.amount_max_cents {
        result.retain(|exp| exp.amount_cents <= max);
    }

    if let Some(method) = filters.payment_method {
        result.retain(|exp| exp.payment_method == Some(method));
    }

    sort_expenses(result, sort.field, sort.direction)
}

// =============================================================================
// Tags
// =============================================================================

/// Parses a comma-separated tag string into trimmed lowercase labels.
///
/// ## Example
/// ```rust
/// use tally_core::filter::parse_tags;
///
/// assert_eq!(parse_tags(" Coffee, WORK ,"), vec!["coffee", "work"]);
/// assert!(parse_tags("   ").is_empty());
/// ```
pub fn parse_tags(tag_string: &str) -> Vec<String> {
    tag_string
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Joins tags back into the display form.
pub fn tags_to_string(tags: &[String]) -> String {
    tags.join(", ")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{NaiveDate, TimeZone};

    fn expense(id: &str, cents: i64, description: &str, day: u32) -> Expense {
        Expense {
            id: id.to_string(),
            user_id: "local".to_string(),
            amount_cents: cents,
            description: description.to_string(),
            category_id: "cat_food".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            merchant: None,
            payment_method: None,
            notes: None,
            tags: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_search_matches_all_text_fields() {
        let mut a = expense("e1", 100, "Morning coffee", 1);
        a.merchant = Some("Starbucks".to_string());
        let mut b = expense("e2", 200, "Lunch", 2);
        b.notes = Some("team coffee run".to_string());
        let mut c = expense("e3", 300, "Groceries", 3);
        c.tags = Some(vec!["coffee".to_string()]);
        let d = expense("e4", 400, "Rent", 4);

        let all = vec![a, b, c, d];
        let hits = search_expenses(&all, "COFFEE");
        assert_eq!(hits.len(), 3);

        let merchant_hits = search_expenses(&all, "starbucks");
        assert_eq!(merchant_hits.len(), 1);
        assert_eq!(merchant_hits[0].id, "e1");
    }

    #[test]
    fn test_blank_search_returns_everything() {
        let all = vec![expense("e1", 100, "A", 1), expense("e2", 200, "B", 2)];
        assert_eq!(search_expenses(&all, "").len(), 2);
        assert_eq!(search_expenses(&all, "   ").len(), 2);
    }

    #[test]
    fn test_sort_directions() {
        let all = vec![
            expense("e1", 300, "banana", 2),
            expense("e2", 100, "Apple", 3),
            expense("e3", 200, "cherry", 1),
        ];

        let by_amount = sort_expenses(all.clone(), SortField::Amount, SortDirection::Asc);
        assert_eq!(by_amount[0].id, "e2");
        assert_eq!(by_amount[2].id, "e1");

        let by_date_desc = sort_expenses(all.clone(), SortField::Date, SortDirection::Desc);
        assert_eq!(by_date_desc[0].id, "e2");

        // Case-insensitive description ordering: Apple < banana < cherry.
        let by_desc = sort_expenses(all, SortField::Description, SortDirection::Asc);
        assert_eq!(by_desc[0].description, "Apple");
        assert_eq!(by_desc[1].description, "banana");
    }

    #[test]
    fn test_sort_is_stable() {
        let all = vec![
            expense("first", 100, "Same", 1),
            expense("second", 100, "Same", 1),
        ];
        let sorted = sort_expenses(all, SortField::Amount, SortDirection::Asc);
        assert_eq!(sorted[0].id, "first");
        assert_eq!(sorted[1].id, "second");
    }

    #[test]
    fn test_date_range_is_inclusive_at_day_granularity() {
        let all = vec![
            expense("e1", 100, "A", 1),
            expense("e2", 200, "B", 10),
            expense("e3", 300, "C", 20),
        ];
        // Bounds given mid-day still capture the whole boundary days.
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 45, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 10, 3, 15, 0).unwrap();
        let hits = filter_by_date_range(&all, start, end);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "e1");
        assert_eq!(hits[1].id, "e2");
    }

    #[test]
    fn test_period_subsets() {
        let all = vec![
            expense("today", 100, "A", 15),
            expense("this_week", 200, "B", 11), // Monday of the current week
            expense("this_month", 300, "C", 2),
            expense("old", 400, "D", 1),
        ];
        assert_eq!(today_expenses(&all, now()).len(), 1);
        assert_eq!(week_expenses(&all, now()).len(), 2);
        assert_eq!(month_expenses(&all, now()).len(), 4);
    }

    #[test]
    fn test_apply_filters_pipeline() {
        let mut a = expense("e1", 1500, "Coffee beans", 14);
        a.payment_method = Some(PaymentMethod::Card);
        let mut b = expense("e2", 9000, "Coffee machine", 13);
        b.payment_method = Some(PaymentMethod::Cash);
        let c = expense("e3", 500, "Bus ticket", 12);

        let filters = ExpenseFilters {
            search: Some("coffee".to_string()),
            amount_max_cents: Some(5000),
            payment_method: Some(PaymentMethod::Card),
            ..ExpenseFilters::default()
        };
        let hits = apply_filters(&[a, b, c], &filters, &ExpenseSort::default(), now());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "e1");
    }

    #[test]
    fn test_apply_filters_open_date_range_defaults_to_now() {
        let future = expense("future", 100, "Scheduled", 25);
        let past = expense("past", 100, "Old", 1);

        let filters = ExpenseFilters {
            date_from: Some(NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date")),
            ..ExpenseFilters::default()
        };
        // Open-ended "to" bound closes at now, excluding future-dated rows.
        let hits = apply_filters(&[future, past], &filters, &ExpenseSort::default(), now());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "past");
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(parse_tags("Coffee, WORK , ,daily"), vec!["coffee", "work", "daily"]);
        assert!(parse_tags("").is_empty());
        assert_eq!(tags_to_string(&["a".to_string(), "b".to_string()]), "a, b");
    }
}
