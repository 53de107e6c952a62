//! # Domain Types
//!
//! Core domain types used throughout Tally.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐         │
//! │  │    Expense    │   │   Category    │   │    Budget     │         │
//! │  │  ───────────  │   │  ───────────  │   │  ───────────  │         │
//! │  │  id           │   │  id           │   │  id           │         │
//! │  │  amount_cents │   │  user_id?     │   │  category_id? │         │
//! │  │  category_id  │   │  name/color   │   │  amount_cents │         │
//! │  │  date         │   │  icon         │   │  period       │         │
//! │  └───────────────┘   └───────────────┘   └───────────────┘         │
//! │                                                                     │
//! │  A Category with user_id = None is a shared system default and     │
//! │  must never be physically deleted. A Budget with                    │
//! │  category_id = None is the overall budget across all spending.     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All types serialize with camelCase field names so the persisted record
//! and remote payloads share one wire layout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How an expense was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Credit or debit card.
    Card,
    /// Digital wallet (Apple Pay, PayPal, etc.).
    Digital,
    /// Direct bank transfer.
    Bank,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Wire/display name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Digital => "digital",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Other => "other",
        }
    }
}

// =============================================================================
// Budget Period
// =============================================================================

/// The recurrence period a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

// =============================================================================
// Expense
// =============================================================================

/// A single recorded expense.
///
/// Identity (`id`) is immutable once created; amount, description, and
/// category are mutable via update. Amounts are integer cents (see
/// [`Money`](crate::money::Money)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Unique identifier (`exp_` prefixed).
    pub id: String,

    /// Owner of the expense (`"local"` until an account signs in).
    pub user_id: String,

    /// Amount in cents (smallest currency unit).
    pub amount_cents: i64,

    /// What the money was spent on.
    pub description: String,

    /// Category this expense belongs to.
    pub category_id: String,

    /// Calendar date of the expense (day granularity).
    pub date: NaiveDate,

    /// When the expense record was created.
    pub created_at: DateTime<Utc>,

    /// When the expense record was last updated.
    pub updated_at: DateTime<Utc>,

    /// Where the money was spent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// How it was paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,

    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Lowercase tag labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Expense {
    /// Returns the amount as a Money type.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Category
// =============================================================================

/// An expense category.
///
/// `user_id = None` marks a shared system default present for every user;
/// editing one as an authenticated user converts it to user-owned rather
/// than mutating the shared default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier (`cat_` prefixed; seed ids are well-known).
    pub id: String,

    /// Owning user, or None for system defaults.
    pub user_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Emoji or icon token shown in the UI.
    pub icon: String,

    /// Hex display color.
    pub color: String,

    /// When the category was created.
    pub created_at: DateTime<Utc>,

    /// Parent category for hierarchies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Per-category budget attached directly to the category, in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cents: Option<i64>,

    /// Period the attached budget applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_period: Option<BudgetPeriod>,
}

impl Category {
    /// Returns the attached budget amount, if any.
    #[inline]
    pub fn budget(&self) -> Option<Money> {
        self.budget_cents.map(Money::from_cents)
    }

    /// True for shared system categories (protected from deletion).
    #[inline]
    pub fn is_default(&self) -> bool {
        self.user_id.is_none()
    }
}

// =============================================================================
// Budget
// =============================================================================

/// A spending budget, either per-category or overall.
///
/// `spent_cents` is denormalized for display snapshots; the authoritative
/// value is always recomputed from expenses (see
/// [`spent_for_budget`](crate::budget::spent_for_budget)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Unique identifier (`bgt_` prefixed).
    pub id: String,

    /// Owning user.
    pub user_id: String,

    /// Category this budget covers, or None for the overall budget.
    pub category_id: Option<String>,

    /// Budget amount in cents.
    pub amount_cents: i64,

    /// Recurrence period.
    pub period: BudgetPeriod,

    /// Start of the budget window.
    pub start_date: DateTime<Utc>,

    /// End of the budget window; open-ended (now) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Denormalized spent amount in cents (not authoritative).
    pub spent_cents: i64,

    /// When the budget was created.
    pub created_at: DateTime<Utc>,

    /// When the budget was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Returns the budget amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    /// True when this budget applies across all categories.
    #[inline]
    pub fn is_overall(&self) -> bool {
        self.category_id.is_none()
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Date display format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
}

/// UI theme options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// Per-installation user preferences (singleton in the local store).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// ISO currency code used for display.
    pub currency: String,

    /// Preferred date display format.
    pub date_format: DateFormat,

    /// UI theme.
    pub theme: Theme,

    /// BCP-47 language tag.
    pub language: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        UserPreferences {
            currency: "USD".to_string(),
            date_format: DateFormat::MonthDayYear,
            theme: Theme::Dark,
            language: "en".to_string(),
        }
    }
}

// =============================================================================
// Filters & Sorting
// =============================================================================

/// Filter criteria for the expense list view.
///
/// `None` fields mean "no restriction"; all present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilters {
    /// Case-insensitive text search across description/merchant/notes/tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Restrict to a single category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// Inclusive start of the date range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,

    /// Inclusive end of the date range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,

    /// Minimum amount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_min_cents: Option<i64>,

    /// Maximum amount in cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_max_cents: Option<i64>,

    /// Restrict to one payment method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// Field the expense list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Description,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sort specification for the expense list view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSort {
    pub field: SortField,
    pub direction: SortDirection,
}

// =============================================================================
// Stats & Progress
// =============================================================================

/// Aggregate statistics over a set of expenses.
///
/// An empty input yields the all-zero value, never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub total: Money,
    pub count: usize,
    pub average: Money,
    pub highest: Money,
    pub lowest: Money,
}

/// Per-category aggregate, ordered by descending total in reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_id: String,
    pub category_name: String,
    pub total: Money,
    pub count: usize,
    /// Share of the grand total, 0-100.
    pub percentage: f64,
    pub color: String,
}

/// Traffic-light budget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Safe,
    Warning,
    Danger,
}

/// Computed progress of one budget against matching expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    pub budget: Budget,
    pub spent: Money,
    pub remaining: Money,
    /// Clamped to 0-100.
    pub percentage: f64,
    pub status: BudgetStatus,
}

// =============================================================================
// Storage Record
// =============================================================================

/// Current schema version of the persisted record.
pub const STORAGE_VERSION: u32 = 1;

/// The single keyed record persisted by the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageData {
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
    pub budgets: Vec<Budget>,
    pub preferences: UserPreferences,
    pub version: u32,
    pub last_updated: DateTime<Utc>,
}

impl StorageData {
    /// Returns the default empty record at the current schema version.
    pub fn empty() -> Self {
        StorageData {
            expenses: Vec::new(),
            categories: Vec::new(),
            budgets: Vec::new(),
            preferences: UserPreferences::default(),
            version: STORAGE_VERSION,
            last_updated: Utc::now(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
