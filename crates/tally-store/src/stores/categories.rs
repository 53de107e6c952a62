//! # Category Store
//!
//! Authoritative in-memory category collection.
//!
//! Two rules distinguish this store from its siblings:
//!
//! - **Default-category protection**: a category with `user_id = None`
//!   is a shared system default and is never physically deleted:
//!   `delete` rejects it and leaves the collection untouched.
//! - **Ownership conversion**: when an authenticated user edits a
//!   default category, the update rewrites `user_id` to that user
//!   (unless the patch explicitly supplies an owner), so the edit lands
//!   on a user-owned copy rather than mutating the shared default.

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use tally_core::ids::{generate_id, CATEGORY_PREFIX};
use tally_core::types::{BudgetPeriod, Category};

use crate::local::LocalStore;
use crate::seed::default_categories;
use crate::stores::spawn_persist;

// =============================================================================
// Input Types
// =============================================================================

/// Fields supplied when creating a category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    /// Owner; None creates a system category (seed tooling only).
    pub user_id: Option<String>,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub parent_id: Option<String>,
    pub budget_cents: Option<i64>,
    pub budget_period: Option<BudgetPeriod>,
}

/// Partial update; `None` fields are left untouched.
///
/// `user_id` set here overrides the ownership-conversion default.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub parent_id: Option<String>,
    pub budget_cents: Option<i64>,
    pub budget_period: Option<BudgetPeriod>,
}

// =============================================================================
// Category Store
// =============================================================================

/// Observable store for the category collection.
pub struct CategoryStore {
    tx: watch::Sender<Vec<Category>>,
    local: LocalStore,
    persist: JoinHandle<()>,
}

impl CategoryStore {
    /// Creates the store. An empty persisted collection seeds from the
    /// default category set, so the nine system categories are always
    /// present on a fresh install.
    pub async fn new(local: LocalStore) -> Self {
        let stored = local.load().await.categories;
        let initial = if stored.is_empty() {
            let seed = default_categories();
            // First run: mirror the seed set immediately so the persisted
            // record matches the in-memory collection.
            if !local.save_categories(&seed).await {
                debug!("Seed categories could not be persisted");
            }
            seed
        } else {
            stored
        };
        let (tx, _) = watch::channel(initial);

        let persist_local = local.clone();
        let persist = spawn_persist(
            "categories",
            tx.subscribe(),
            move |categories: Vec<Category>| {
                let local = persist_local.clone();
                async move { local.save_categories(&categories).await }
            },
        );

        CategoryStore { tx, local, persist }
    }

    /// Re-reads the collection from the local store, falling back to the
    /// seed set when empty.
    pub async fn init(&self) {
        let stored = self.local.load().await.categories;
        let categories = if stored.is_empty() {
            default_categories()
        } else {
            stored
        };
        self.tx.send_replace(categories);
    }

    /// Current collection snapshot.
    pub fn snapshot(&self) -> Vec<Category> {
        self.tx.borrow().clone()
    }

    /// Subscribes to collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Category>> {
        self.tx.subscribe()
    }

    /// Number of categories currently held.
    pub fn count(&self) -> usize {
        self.tx.borrow().len()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a category and returns it.
    pub fn add(&self, input: NewCategory) -> Category {
        let category = Category {
            id: generate_id(CATEGORY_PREFIX),
            user_id: input.user_id,
            name: input.name.trim().to_string(),
            icon: input.icon,
            color: input.color,
            created_at: Utc::now(),
            parent_id: input.parent_id,
            budget_cents: input.budget_cents,
            budget_period: input.budget_period,
        };

        debug!(id = %category.id, name = %category.name, "Adding category");
        let created = category.clone();
        self.tx.send_modify(|categories| categories.push(category));
        created
    }

    /// Applies a partial update. Returns whether the id existed.
    ///
    /// When `acting_user` edits a default category and the patch carries
    /// no explicit owner, the category converts to user-owned.
    pub fn update(&self, id: &str, patch: CategoryPatch, acting_user: Option<&str>) -> bool {
        let mut found = false;
        self.tx.send_modify(|categories| {
            if let Some(category) = categories.iter_mut().find(|c| c.id == id) {
                found = true;

                match patch.user_id {
                    Some(user_id) => category.user_id = Some(user_id),
                    None => {
                        if category.user_id.is_none() {
                            if let Some(user) = acting_user {
                                debug!(id = %category.id, user, "Converting default category to user-owned");
                                category.user_id = Some(user.to_string());
                            }
                        }
                    }
                }

                if let Some(name) = patch.name {
                    category.name = name;
                }
                if let Some(icon) = patch.icon {
                    category.icon = icon;
                }
                if let Some(color) = patch.color {
                    category.color = color;
                }
                if let Some(parent_id) = patch.parent_id {
                    category.parent_id = Some(parent_id);
                }
                if let Some(budget_cents) = patch.budget_cents {
                    category.budget_cents = Some(budget_cents);
                }
                if let Some(budget_period) = patch.budget_period {
                    category.budget_period = Some(budget_period);
                }
            }
        });
        found
    }

    /// Deletes a category. Returns false (and mutates nothing) when the
    /// id is missing or targets a protected default category.
    pub fn delete(&self, id: &str) -> bool {
        let mut deleted = false;
        self.tx.send_modify(|categories| {
            let Some(index) = categories.iter().position(|c| c.id == id) else {
                return;
            };
            if categories[index].is_default() {
                debug!(id, "Refusing to delete default category");
                return;
            }
            categories.remove(index);
            deleted = true;
        });
        deleted
    }

    /// Looks up a category by id.
    pub fn get_by_id(&self, id: &str) -> Option<Category> {
        self.tx.borrow().iter().find(|c| c.id == id).cloned()
    }

    /// Looks up a category by name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<Category> {
        let needle = name.to_lowercase();
        self.tx
            .borrow()
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
            .cloned()
    }

    /// Restores the seed category set, discarding user categories.
    pub fn reset_to_defaults(&self) {
        self.tx.send_replace(default_categories());
    }

    /// Replaces the whole collection (import / remote merge).
    pub fn replace_all(&self, categories: Vec<Category>) {
        self.tx.send_replace(categories);
    }
}

impl Drop for CategoryStore {
    fn drop(&mut self) {
        self.persist.abort();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
