//! # Merge Rules
//!
//! Pure reconciliation logic between a remote snapshot and the local
//! collection, kept free of any subscription mechanics so each rule is
//! unit-testable in isolation.
//!
//! ## Category Seed-Overlay Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  step 1: start from the full default/seed category set             │
//! │  step 2: overlay any remote record whose id matches a default id   │
//! │          (remote wins: it carries the user's customization)       │
//! │  step 3: append remote records with non-default ids                │
//! │          (user-created categories)                                 │
//! │                                                                     │
//! │  Local non-default categories absent from the remote snapshot are  │
//! │  dropped by the replacement; the remote is the authority for      │
//! │  user-created categories once a session is subscribed.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use tally_core::types::Category;

/// Merges a remote category snapshot over the default seed set.
pub fn merge_categories(defaults: &[Category], remote: &[Category]) -> Vec<Category> {
    let remote_by_id: HashMap<&str, &Category> =
        remote.iter().map(|c| (c.id.as_str(), c)).collect();
    let default_ids: HashSet<&str> = defaults.iter().map(|c| c.id.as_str()).collect();

    let mut merged: Vec<Category> = defaults
        .iter()
        .map(|seed| match remote_by_id.get(seed.id.as_str()) {
            Some(remote_version) => (*remote_version).clone(),
            None => seed.clone(),
        })
        .collect();

    for category in remote {
        if !default_ids.contains(category.id.as_str()) {
            merged.push(category.clone());
        }
    }

    merged
}

/// Content-equality change detection for expenses/budgets: differs when
/// length or serialized content differs.
pub fn collections_differ<T: Serialize>(local: &[T], remote: &[T]) -> bool {
    if local.len() != remote.len() {
        return true;
    }
    serialize(local) != serialize(remote)
}

/// Change detection for the category merge.
///
/// The local collection is considered in sync when its user-owned
/// categories (for `owner`) match the remote snapshot order-independently
/// (sorted by id before comparing) and its system categories are exactly
/// the seed set.
pub fn categories_differ(
    local: &[Category],
    remote: &[Category],
    owner: &str,
    seed_len: usize,
) -> bool {
    let local_user: Vec<&Category> = local
        .iter()
        .filter(|c| c.user_id.as_deref() == Some(owner))
        .collect();
    let local_system_count = local.iter().filter(|c| c.user_id.is_none()).count();

    if local_user.len() != remote.len() {
        return true;
    }
    if local_system_count != seed_len {
        return true;
    }

    let mut local_sorted: Vec<&Category> = local_user;
    local_sorted.sort_by(|a, b| a.id.cmp(&b.id));
    let mut remote_sorted: Vec<&Category> = remote.iter().collect();
    remote_sorted.sort_by(|a, b| a.id.cmp(&b.id));

    serialize(&local_sorted) != serialize(&remote_sorted)
}

fn serialize<T: Serialize + ?Sized>(value: &T) -> String {
    // Our domain types always serialize; an empty fallback keeps the
    // comparison total.
    serde_json::to_string(value).unwrap_or_default()
}

// =============================================================================
// Unit Tests
// =============================================================================
