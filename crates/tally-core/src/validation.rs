//! # Validation Module
//!
//! Entity validation for Tally.
//!
//! Aggregate validators collect every problem into a `Vec` (empty =
//! valid) so a form can surface all messages at once. Individual rule
//! functions return a `ValidationResult` for callers that want to bail
//! on the first failure. Nothing here panics or raises past this layer.

use crate::error::ValidationError;
use crate::types::{Budget, Category, Expense};

/// Result type for single-rule validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Rules
// =============================================================================

/// Validates that an amount is strictly positive.
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a description.
///
/// ## Rules
/// - Must not be blank
/// - Must be at most 200 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }
    if description.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 200,
        });
    }
    Ok(())
}

/// Validates a category reference.
pub fn validate_category_id(category_id: &str) -> ValidationResult<()> {
    if category_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "categoryId".to_string(),
        });
    }
    Ok(())
}

/// Validates a category display name.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Aggregate Validators
// =============================================================================

/// Validates an expense, returning every violated rule.
///
/// ## Example
/// ```rust
/// # use chrono::Utc;
/// # use tally_core::types::Expense;
/// use tally_core::validation::validate_expense;
/// # let mut expense = Expense {
/// #     id: "exp_x".into(), user_id: "local".into(), amount_cents: 1250,
/// #     description: "Lunch".into(), category_id: "cat_food".into(),
/// #     date: Utc::now().date_naive(), created_at: Utc::now(),
/// #     updated_at: Utc::now(), merchant: None, payment_method: None,
/// #     notes: None, tags: None,
/// # };
/// assert!(validate_expense(&expense).is_empty());
///
/// expense.amount_cents = 0;
/// expense.description.clear();
/// assert_eq!(validate_expense(&expense).len(), 2);
/// ```
pub fn validate_expense(expense: &Expense) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_amount_cents(expense.amount_cents) {
        errors.push(e);
    }
    if let Err(e) = validate_description(&expense.description) {
        errors.push(e);
    }
    if let Err(e) = validate_category_id(&expense.category_id) {
        errors.push(e);
    }
    errors
}

/// Validates a category, returning every violated rule.
pub fn validate_category(category: &Category) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_category_name(&category.name) {
        errors.push(e);
    }
    if let Some(budget) = category.budget_cents {
        if budget < 0 {
            errors.push(ValidationError::NegativeNotAllowed {
                field: "budget".to_string(),
            });
        }
    }
    errors
}

/// Validates a budget, returning every violated rule.
pub fn validate_budget(budget: &Budget) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if let Err(e) = validate_amount_cents(budget.amount_cents) {
        errors.push(e);
    }
    if let Some(end) = budget.end_date {
        if end < budget.start_date {
            errors.push(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "must not precede startDate".to_string(),
            });
        }
    }
    errors
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BudgetPeriod;
    use chrono::{Duration, Utc};

    fn valid_expense() -> Expense {
        Expense {
            id: "exp_test".to_string(),
            user_id: "local".to_string(),
            amount_cents: 1250,
            description: "Lunch".to_string(),
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

    #[test]
    fn test_valid_expense_has_no_errors() {
        assert!(validate_expense(&valid_expense()).is_empty());
    }

    #[test]
    fn test_expense_rules() {
        let mut e = valid_expense();
        e.amount_cents = -5;
        e.description = "   ".to_string();
        e.category_id = String::new();
        let errors = validate_expense(&e);
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .any(|err| matches!(err, ValidationError::MustBePositive { .. })));
    }

    #[test]
    fn test_category_rules() {
        let mut cat = Category {
            id: "cat_x".to_string(),
            user_id: Some("u1".to_string()),
            name: "Coffee".to_string(),
            icon: "☕".to_string(),
            color: "#000000".to_string(),
            created_at: Utc::now(),
            parent_id: None,
            budget_cents: Some(5000),
            budget_period: Some(BudgetPeriod::Monthly),
        };
        assert!(validate_category(&cat).is_empty());

        cat.name.clear();
        cat.budget_cents = Some(-1);
        assert_eq!(validate_category(&cat).len(), 2);
    }

    #[test]
    fn test_budget_rules() {
        let now = Utc::now();
        let mut b = Budget {
            id: "bgt_x".to_string(),
            user_id: "local".to_string(),
            category_id: None,
            amount_cents: 10_000,
            period: BudgetPeriod::Monthly,
            start_date: now,
            end_date: None,
            spent_cents: 0,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_budget(&b).is_empty());

        b.amount_cents = 0;
        b.end_date = Some(now - Duration::days(1));
        assert_eq!(validate_budget(&b).len(), 2);
    }
}
