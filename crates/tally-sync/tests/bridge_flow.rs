//! End-to-end bridge flows against the in-memory remote: inbound merge
//! idempotence, the category seed-overlay path, subscription lifecycle,
//! and the outbound create-or-update push.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tally_core::ids::generate_id;
use tally_core::types::{Budget, BudgetPeriod, Category, Expense};
use tally_store::stores::{BudgetStore, CategoryStore, ExpenseStore, NewCategory};
use tally_store::{LocalStore, StoreConfig};
use tally_sync::{MemoryRemote, StaticAuth, SyncBridge, SyncConfig};

// =============================================================================
// Fixtures
// =============================================================================

struct Fixture {
    expenses: Arc<ExpenseStore>,
    categories: Arc<CategoryStore>,
    budgets: Arc<BudgetStore>,
    remote: Arc<MemoryRemote>,
    auth: Arc<StaticAuth>,
    bridge: SyncBridge<MemoryRemote, StaticAuth>,
}

async fn fixture(auth: StaticAuth, config: SyncConfig) -> Fixture {
    let local = LocalStore::open(StoreConfig::in_memory()).await;
    let expenses = Arc::new(ExpenseStore::new(local.clone()).await);
    let categories = Arc::new(CategoryStore::new(local.clone()).await);
    let budgets = Arc::new(BudgetStore::new(local.clone()).await);
    let remote = Arc::new(MemoryRemote::new());
    let auth = Arc::new(auth);
    let bridge = SyncBridge::new(
        expenses.clone(),
        categories.clone(),
        budgets.clone(),
        remote.clone(),
        auth.clone(),
        config,
    );
    Fixture {
        expenses,
        categories,
        budgets,
        remote,
        auth,
        bridge,
    }
}

fn remote_expense(id: &str, cents: i64, owner: &str) -> Expense {
    Expense {
        id: id.to_string(),
        user_id: owner.to_string(),
        amount_cents: cents,
        description: format!("{id} purchase"),
        category_id: "cat_food".to_string(),
        date: Utc::now().date_naive(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        merchant: None,
        payment_method: None,
        notes: None,
        tags: None,
    }
}

fn remote_category(id: &str, name: &str, owner: &str) -> Category {
    Category {
        id: id.to_string(),
        user_id: Some(owner.to_string()),
        name: name.to_string(),
        icon: "🏷️".to_string(),
        color: "#123456".to_string(),
        created_at: Utc::now(),
        parent_id: None,
        budget_cents: None,
        budget_period: None,
    }
}

fn remote_budget(id: &str, cents: i64, owner: &str) -> Budget {
    Budget {
        id: id.to_string(),
        user_id: owner.to_string(),
        category_id: None,
        amount_cents: cents,
        period: BudgetPeriod::Monthly,
        start_date: Utc::now(),
        end_date: None,
        spent_cents: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Polls until `check` passes or a 2 s deadline expires.
async fn eventually<F: Fn() -> bool>(check: F, what: &str) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never reached: {what}");
}

// =============================================================================
// Inbound Merge
// =============================================================================

#[tokio::test]
async fn inbound_expense_snapshot_replaces_local() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");

    f.remote
        .set_expenses(vec![remote_expense("exp_r1", 1_000, "user-1")]);
    eventually(|| f.expenses.count() == 1, "expense snapshot applied").await;
    assert_eq!(f.expenses.snapshot()[0].id, "exp_r1");
}

#[tokio::test]
async fn repeated_snapshot_is_idempotent() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");

    let record = remote_expense("exp_r1", 1_000, "user-1");
    f.remote.set_expenses(vec![record.clone()]);
    eventually(|| f.expenses.count() == 1, "first snapshot applied").await;

    // Re-deliver the identical snapshot: the content-equality check must
    // short-circuit: no replacement, no second local write.
    let mut rx = f.expenses.subscribe();
    f.remote.set_expenses(vec![record]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!rx.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn category_snapshot_goes_through_seed_overlay_merge() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");
    assert_eq!(f.categories.count(), 9);

    // Remote holds a customized default plus a user-created category.
    f.remote.set_categories(vec![
        remote_category("cat_food", "Eating Out", "user-1"),
        remote_category("cat_pets", "Pets", "user-1"),
    ]);
    eventually(|| f.categories.count() == 10, "merged categories applied").await;

    let merged = f.categories.snapshot();
    let food = merged.iter().find(|c| c.id == "cat_food").expect("food");
    assert_eq!(food.name, "Eating Out");
    assert_eq!(food.user_id.as_deref(), Some("user-1"));
    // The other eight defaults survive untouched.
    assert_eq!(merged.iter().filter(|c| c.user_id.is_none()).count(), 8);
    assert!(merged.iter().any(|c| c.id == "cat_pets"));
}

#[tokio::test]
async fn empty_initial_category_snapshot_spares_local_user_categories() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;

    // A category created locally before the remote echo arrives.
    f.categories.add(NewCategory {
        user_id: Some("user-1".to_string()),
        name: "Pets".to_string(),
        icon: "🐕".to_string(),
        color: "#8B5A2B".to_string(),
        ..NewCategory::default()
    });
    assert_eq!(f.categories.count(), 10);

    f.bridge.start("user-1").await.expect("start");

    // The initial (empty) snapshot must not wipe the local category.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(f.categories.count(), 10);

    // A later real snapshot applies normally.
    f.remote
        .set_categories(vec![remote_category("cat_pets", "Pets", "user-1")]);
    eventually(
        || {
            let snapshot = f.categories.snapshot();
            snapshot.len() == 10 && snapshot.iter().any(|c| c.id == "cat_pets")
        },
        "real category snapshot applied",
    )
    .await;
}

#[tokio::test]
async fn inbound_budget_snapshot_replaces_local() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");

    f.remote
        .set_budgets(vec![remote_budget("bgt_r1", 300_000, "user-1")]);
    eventually(|| f.budgets.count() == 1, "budget snapshot applied").await;
    assert_eq!(f.budgets.snapshot()[0].id, "bgt_r1");
}

// =============================================================================
// Subscription Lifecycle
// =============================================================================

#[tokio::test]
async fn stop_releases_all_subscriptions() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");
    assert!(f.bridge.is_active().await);

    f.bridge.stop().await;
    assert!(!f.bridge.is_active().await);

    // Remote changes no longer reach the local stores.
    f.remote
        .set_expenses(vec![remote_expense("exp_r1", 1_000, "user-1")]);
    f.remote
        .set_budgets(vec![remote_budget("bgt_r1", 1_000, "user-1")]);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(f.expenses.count(), 0);
    assert_eq!(f.budgets.count(), 0);
}

#[tokio::test]
async fn restart_replaces_prior_subscription_set() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.bridge.start("user-1").await.expect("start");
    f.bridge.start("user-2").await.expect("restart");

    assert_eq!(f.bridge.active_owner().await.as_deref(), Some("user-2"));

    // A single live subscription: one snapshot application, no duplicate
    // processing from the aborted set.
    f.remote
        .set_expenses(vec![remote_expense("exp_r1", 1_000, "user-2")]);
    eventually(|| f.expenses.count() == 1, "snapshot applied once").await;
}

// =============================================================================
// Outbound Push
// =============================================================================

#[tokio::test]
async fn push_creates_then_updates_on_collision() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;

    let mut expense = remote_expense(&generate_id("exp"), 2_500, "local");
    f.bridge.push_expense(&expense).await.expect("create push");

    let stored = f.remote.expense_records();
    assert_eq!(stored.len(), 1);
    // Identity was rewritten to the authenticated user.
    assert_eq!(stored[0].user_id, "user-1");

    // Second push of the same id hits AlreadyExists and falls back to
    // update.
    expense.description = "Updated description".to_string();
    f.bridge.push_expense(&expense).await.expect("update push");

    let stored = f.remote.expense_records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "Updated description");
}

#[tokio::test]
async fn push_skips_invalid_records_silently() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;

    let mut invalid = remote_expense(&generate_id("exp"), 0, "user-1");
    invalid.description = "  ".to_string();
    f.bridge.push_expense(&invalid).await.expect("silent skip");
    assert!(f.remote.expense_records().is_empty());

    let mut unnamed = remote_category(&generate_id("cat"), "", "user-1");
    unnamed.name = String::new();
    f.bridge.push_category(&unnamed).await.expect("silent skip");
    assert!(f.remote.category_records().is_empty());
}

#[tokio::test]
async fn push_skips_when_unauthenticated() {
    let config = SyncConfig::default().auth_wait(Duration::from_millis(50));
    let f = fixture(StaticAuth::signed_out(), config).await;

    let expense = remote_expense(&generate_id("exp"), 2_500, "local");
    // Gives up after the bounded wait and reports success (skip).
    f.bridge.push_expense(&expense).await.expect("skip");
    assert!(f.remote.expense_records().is_empty());
}

#[tokio::test]
async fn push_waits_for_auth_transition() {
    let config = SyncConfig::default().auth_wait(Duration::from_millis(500));
    let f = fixture(StaticAuth::signed_out(), config).await;

    let auth = f.auth.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        auth.sign_in("late-user");
    });

    let expense = remote_expense(&generate_id("exp"), 2_500, "local");
    f.bridge.push_expense(&expense).await.expect("push after sign-in");

    let stored = f.remote.expense_records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, "late-user");
}

#[tokio::test]
async fn push_surfaces_remote_failures() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;
    f.remote.reject_writes(true);

    let expense = remote_expense(&generate_id("exp"), 2_500, "user-1");
    let err = f.bridge.push_expense(&expense).await.expect_err("surfaced");
    assert!(err.is_retryable());

    let budget = remote_budget(&generate_id("bgt"), 10_000, "user-1");
    assert!(f.bridge.push_budget(&budget).await.is_err());
}

// =============================================================================
// Outbound Delete
// =============================================================================

#[tokio::test]
async fn remote_delete_is_best_effort() {
    let f = fixture(StaticAuth::signed_in("user-1"), SyncConfig::default()).await;

    let expense = remote_expense("exp_del", 2_500, "user-1");
    f.bridge.push_expense(&expense).await.expect("push");
    assert_eq!(f.remote.expense_records().len(), 1);

    f.bridge.delete_expense_remote("exp_del").await;
    assert!(f.remote.expense_records().is_empty());

    // Deleting a missing record is a no-op, not an error surface.
    f.bridge.delete_expense_remote("exp_never_existed").await;
    f.bridge.delete_budget_remote("bgt_never_existed").await;
    f.bridge.delete_category_remote("cat_never_existed").await;
}
