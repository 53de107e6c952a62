//! # Expense Store
//!
//! Authoritative in-memory expense collection with watch-based change
//! notification and auto-persistence.

use chrono::{NaiveDate, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use tally_core::filter::parse_tags;
use tally_core::ids::{generate_id, EXPENSE_PREFIX};
use tally_core::types::{Expense, PaymentMethod};

use crate::local::LocalStore;
use crate::stores::spawn_persist;

// =============================================================================
// Input Types
// =============================================================================

/// Fields supplied when recording a new expense.
///
/// Mirrors the add-expense form: the store assigns id and timestamps,
/// defaults a blank date to today, trims text, and parses the
/// comma-separated tag string.
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub amount_cents: i64,
    pub description: String,
    pub category_id: String,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    /// Comma-separated tag labels, e.g. `"coffee, work"`.
    pub tags: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount_cents: Option<i64>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

// =============================================================================
// Expense Store
// =============================================================================

/// Observable store for the expense collection.
pub struct ExpenseStore {
    tx: watch::Sender<Vec<Expense>>,
    local: LocalStore,
    persist: JoinHandle<()>,
}

impl ExpenseStore {
    /// Creates the store, seeding the collection from the local store and
    /// spawning its auto-persist task.
    pub async fn new(local: LocalStore) -> Self {
        let initial = local.load().await.expenses;
        let (tx, _) = watch::channel(initial);

        let persist_local = local.clone();
        let persist = spawn_persist("expenses", tx.subscribe(), move |expenses: Vec<Expense>| {
            let local = persist_local.clone();
            async move { local.save_expenses(&expenses).await }
        });

        ExpenseStore { tx, local, persist }
    }

    /// Re-reads the collection from the local store (e.g. after an
    /// import replaced the persisted record).
    pub async fn init(&self) {
        let expenses = self.local.load().await.expenses;
        self.tx.send_replace(expenses);
    }

    /// Current collection snapshot.
    pub fn snapshot(&self) -> Vec<Expense> {
        self.tx.borrow().clone()
    }

    /// Subscribes to collection changes. Every mutation wakes every
    /// subscriber.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Expense>> {
        self.tx.subscribe()
    }

    /// Number of expenses currently held.
    pub fn count(&self) -> usize {
        self.tx.borrow().len()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Records a new expense and returns it (with generated id and
    /// timestamps). Newest entries go first, matching the list view.
    pub fn add(&self, input: NewExpense, user_id: &str) -> Expense {
        let now = Utc::now();
        let expense = Expense {
            id: generate_id(EXPENSE_PREFIX),
            user_id: user_id.to_string(),
            amount_cents: input.amount_cents,
            description: input.description.trim().to_string(),
            category_id: input.category_id,
            date: input.date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
            merchant: input
                .merchant
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            payment_method: input.payment_method,
            notes: input
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            tags: input
                .tags
                .map(|t| parse_tags(&t))
                .filter(|t| !t.is_empty()),
        };

        debug!(id = %expense.id, amount = expense.amount_cents, "Adding expense");
        let created = expense.clone();
        self.tx.send_modify(|expenses| expenses.insert(0, expense));
        created
    }

    /// Applies a partial update. Returns whether the id existed.
    pub fn update(&self, id: &str, patch: ExpensePatch) -> bool {
        let mut found = false;
        self.tx.send_modify(|expenses| {
            if let Some(expense) = expenses.iter_mut().find(|e| e.id == id) {
                found = true;
                if let Some(amount_cents) = patch.amount_cents {
                    expense.amount_cents = amount_cents;
                }
                if let Some(description) = patch.description {
                    expense.description = description;
                }
                if let Some(category_id) = patch.category_id {
                    expense.category_id = category_id;
                }
                if let Some(date) = patch.date {
                    expense.date = date;
                }
                if let Some(merchant) = patch.merchant {
                    expense.merchant = Some(merchant);
                }
                if let Some(payment_method) = patch.payment_method {
                    expense.payment_method = Some(payment_method);
                }
                if let Some(notes) = patch.notes {
                    expense.notes = Some(notes);
                }
                if let Some(tags) = patch.tags {
                    expense.tags = Some(tags);
                }
                expense.updated_at = Utc::now();
            }
        });
        found
    }

    /// Deletes an expense. Returns whether the id existed.
    pub fn delete(&self, id: &str) -> bool {
        let mut found = false;
        self.tx.send_modify(|expenses| {
            let before = expenses.len();
            expenses.retain(|e| e.id != id);
            found = expenses.len() != before;
        });
        found
    }

    /// Deletes several expenses at once. Returns how many were removed.
    pub fn delete_many(&self, ids: &[String]) -> usize {
        let mut removed = 0;
        self.tx.send_modify(|expenses| {
            let before = expenses.len();
            expenses.retain(|e| !ids.contains(&e.id));
            removed = before - expenses.len();
        });
        removed
    }

    /// Looks up an expense by id.
    pub fn get_by_id(&self, id: &str) -> Option<Expense> {
        self.tx.borrow().iter().find(|e| e.id == id).cloned()
    }

    /// Removes every expense.
    pub fn clear(&self) {
        self.tx.send_replace(Vec::new());
    }

    /// Replaces the whole collection (import / remote merge).
    pub fn replace_all(&self, expenses: Vec<Expense>) {
        self.tx.send_replace(expenses);
    }
}

impl Drop for ExpenseStore {
    fn drop(&mut self) {
        self.persist.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
