//! # Seed Data
//!
//! Default categories and demo records for new installations.
//!
//! The default category set is fixed: nine system categories
//! (`user_id = None`) with well-known ids. They are present whenever
//! local storage is empty and are protected from deletion; editing one
//! as an authenticated user converts it to user-owned instead.

use chrono::{DateTime, Duration, TimeZone, Utc};

use tally_core::dates::start_of_month;
use tally_core::ids::generate_id;
use tally_core::types::{
    Budget, BudgetPeriod, Category, Expense, PaymentMethod, StorageData, STORAGE_VERSION,
};
use tally_core::LOCAL_USER_ID;

use crate::local::LocalStore;

/// Creation timestamp stamped on the seed categories.
fn seed_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn system_category(
    id: &str,
    name: &str,
    icon: &str,
    color: &str,
    budget_cents: Option<i64>,
) -> Category {
    Category {
        id: id.to_string(),
        user_id: None,
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        created_at: seed_created_at(),
        parent_id: None,
        budget_cents,
        budget_period: budget_cents.map(|_| BudgetPeriod::Monthly),
    }
}

/// The fixed default category set (9 entries).
pub fn default_categories() -> Vec<Category> {
    vec![
        system_category("cat_groceries", "Groceries", "🛒", "#10B981", Some(40_000)),
        system_category("cat_food", "Food & Dining", "🍔", "#F97316", Some(30_000)),
        system_category("cat_travel", "Travel", "✈️", "#06B6D4", Some(25_000)),
        system_category("cat_shopping", "Shopping", "🛍️", "#EC4899", Some(20_000)),
        system_category(
            "cat_entertainment",
            "Entertainment",
            "🎬",
            "#8B5CF6",
            Some(15_000),
        ),
        system_category("cat_housing", "Housing", "🏠", "#6366F1", Some(120_000)),
        system_category("cat_health", "Health", "💊", "#10B981", Some(15_000)),
        system_category(
            "cat_subscriptions",
            "Subscriptions",
            "📺",
            "#A855F7",
            Some(5_000),
        ),
        system_category("cat_other", "Other", "📋", "#64748B", None),
    ]
}

/// True when `id` belongs to the default category set.
pub fn is_default_category_id(id: &str) -> bool {
    default_categories().iter().any(|c| c.id == id)
}

// =============================================================================
// Demo Data
// =============================================================================

fn demo_expense(
    description: &str,
    cents: i64,
    category: &str,
    days_ago: i64,
    merchant: Option<&str>,
    method: PaymentMethod,
    tags: Option<Vec<&str>>,
) -> Expense {
    let now = Utc::now();
    Expense {
        id: generate_id("exp"),
        user_id: LOCAL_USER_ID.to_string(),
        amount_cents: cents,
        description: description.to_string(),
        category_id: category.to_string(),
        date: (now - Duration::days(days_ago)).date_naive(),
        created_at: now,
        updated_at: now,
        merchant: merchant.map(str::to_string),
        payment_method: Some(method),
        notes: None,
        tags: tags.map(|t| t.into_iter().map(str::to_string).collect()),
    }
}

/// A small demo expense set spread over the last month.
pub fn demo_expenses() -> Vec<Expense> {
    vec![
        demo_expense(
            "Coffee & Snacks",
            1_250,
            "cat_food",
            0,
            Some("Starbucks"),
            PaymentMethod::Card,
            Some(vec!["coffee", "work"]),
        ),
        demo_expense(
            "Grocery Shopping",
            6_730,
            "cat_groceries",
            1,
            Some("Whole Foods"),
            PaymentMethod::Card,
            Some(vec!["groceries", "weekly"]),
        ),
        demo_expense(
            "Netflix Subscription",
            1_599,
            "cat_subscriptions",
            1,
            Some("Netflix"),
            PaymentMethod::Card,
            None,
        ),
        demo_expense(
            "Electric Bill",
            12_400,
            "cat_housing",
            2,
            None,
            PaymentMethod::Bank,
            None,
        ),
        demo_expense(
            "Gas Station",
            3_500,
            "cat_travel",
            3,
            Some("Shell"),
            PaymentMethod::Card,
            None,
        ),
        demo_expense(
            "Restaurant Dinner",
            8_550,
            "cat_food",
            4,
            Some("Olive Garden"),
            PaymentMethod::Card,
            Some(vec!["dining", "social"]),
        ),
        demo_expense(
            "Movie Theater",
            4_500,
            "cat_entertainment",
            4,
            Some("AMC Theaters"),
            PaymentMethod::Card,
            None,
        ),
        demo_expense(
            "New Shoes",
            8_999,
            "cat_shopping",
            5,
            Some("Nike Store"),
            PaymentMethod::Card,
            None,
        ),
        demo_expense(
            "Gym Membership",
            4_999,
            "cat_health",
            8,
            Some("Planet Fitness"),
            PaymentMethod::Card,
            None,
        ),
        demo_expense(
            "Rent",
            120_000,
            "cat_housing",
            20,
            None,
            PaymentMethod::Bank,
            None,
        ),
        demo_expense(
            "Weekend Trip",
            35_000,
            "cat_travel",
            28,
            None,
            PaymentMethod::Digital,
            Some(vec!["vacation", "weekend"]),
        ),
    ]
}

fn demo_budget(category_id: Option<&str>, cents: i64) -> Budget {
    let now = Utc::now();
    Budget {
        id: generate_id("bgt"),
        user_id: LOCAL_USER_ID.to_string(),
        category_id: category_id.map(str::to_string),
        amount_cents: cents,
        period: BudgetPeriod::Monthly,
        start_date: start_of_month(now),
        end_date: None,
        spent_cents: 0,
        created_at: now,
        updated_at: now,
    }
}

/// Demo budgets: one overall plus a handful of category budgets.
pub fn demo_budgets() -> Vec<Budget> {
    vec![
        demo_budget(None, 300_000),
        demo_budget(Some("cat_groceries"), 40_000),
        demo_budget(Some("cat_food"), 30_000),
        demo_budget(Some("cat_travel"), 25_000),
        demo_budget(Some("cat_entertainment"), 15_000),
    ]
}

/// True when the store has no expenses yet (demo data candidate).
pub async fn should_load_demo_data(store: &LocalStore) -> bool {
    store.load().await.expenses.is_empty()
}

/// Replaces the stored collections with the demo dataset.
pub async fn load_demo_data(store: &LocalStore) -> bool {
    let current = store.load().await;
    let data = StorageData {
        expenses: demo_expenses(),
        categories: default_categories(),
        budgets: demo_budgets(),
        preferences: current.preferences,
        version: STORAGE_VERSION,
        last_updated: Utc::now(),
    };
    store.save(&data).await
}

// =============================================================================
// Unit Tests
// =============================================================================
