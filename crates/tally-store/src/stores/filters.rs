//! # Filter Store
//!
//! Observable input for the filtered expense view: the current filter
//! criteria and sort order. Not persisted; filters reset with the
//! session.

use tokio::sync::watch;

use tally_core::types::{ExpenseFilters, ExpenseSort, SortDirection, SortField};

/// Current filter + sort state feeding the filtered expense view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub filters: ExpenseFilters,
    pub sort: ExpenseSort,
}

/// Observable store for expense list filters.
pub struct ExpenseFilterStore {
    tx: watch::Sender<FilterState>,
}

impl Default for ExpenseFilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseFilterStore {
    /// Creates the store with no filters and date-descending sort.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(FilterState::default());
        ExpenseFilterStore { tx }
    }

    /// Current filter state snapshot.
    pub fn snapshot(&self) -> FilterState {
        self.tx.borrow().clone()
    }

    /// Subscribes to filter changes.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.tx.subscribe()
    }

    /// Merges changes into the current filters.
    pub fn update_filters(&self, apply: impl FnOnce(&mut ExpenseFilters)) {
        self.tx.send_modify(|state| apply(&mut state.filters));
    }

    /// Sets the search text (None clears it).
    pub fn set_search(&self, search: Option<String>) {
        self.update_filters(|f| f.search = search);
    }

    /// Sets the category restriction (None = all categories).
    pub fn set_category(&self, category_id: Option<String>) {
        self.update_filters(|f| f.category_id = category_id);
    }

    /// Clears every filter, keeping the sort order.
    pub fn clear_filters(&self) {
        self.tx
            .send_modify(|state| state.filters = ExpenseFilters::default());
    }

    /// Sets the sort order.
    pub fn set_sort(&self, field: SortField, direction: SortDirection) {
        self.tx
            .send_modify(|state| state.sort = ExpenseSort { field, direction });
    }
}
