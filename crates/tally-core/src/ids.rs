//! # Identifier Generation
//!
//! Entity ids are `prefix_` + base-36 millisecond timestamp + 7 base-36
//! random characters, e.g. `exp_lt9xw2ka3f81qz`. The timestamp keeps ids
//! roughly sortable by creation time; the random suffix makes collisions
//! negligible for a personal dataset (and they are not checked).

use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Id prefix for expenses.
pub const EXPENSE_PREFIX: &str = "exp";
/// Id prefix for categories.
pub const CATEGORY_PREFIX: &str = "cat";
/// Id prefix for budgets.
pub const BUDGET_PREFIX: &str = "bgt";

/// Generates a new entity id with the given prefix.
///
/// ## Example
/// ```rust
/// use tally_core::ids::generate_id;
///
/// let id = generate_id("exp");
/// assert!(id.starts_with("exp_"));
/// ```
pub fn generate_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let body = format!("{}{}", to_base36(millis), random_suffix());
    if prefix.is_empty() {
        body
    } else {
        format!("{prefix}_{body}")
    }
}

/// Encodes a number in lowercase base-36.
fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // Digits are drawn from the ASCII base36 alphabet.
    String::from_utf8(digits).unwrap_or_default()
}

/// Seven base-36 characters drawn from uuid v4 entropy.
fn random_suffix() -> String {
    let entropy = Uuid::new_v4().as_u128();
    let mut value = entropy;
    let mut out = String::with_capacity(7);
    for _ in 0..7 {
        out.push(BASE36[(value % 36) as usize] as char);
        value /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prefix_and_shape() {
        let id = generate_id("exp");
        assert!(id.starts_with("exp_"));
        let body = &id["exp_".len()..];
        assert!(body.len() > 7);
        assert!(body.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_no_prefix() {
        let id = generate_id("");
        assert!(!id.contains('_'));
    }

    #[test]
    fn test_to_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(46655), "zzz");
    }

    #[test]
    fn test_ids_are_unique_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id("exp")).collect();
        assert_eq!(ids.len(), 1000);
    }
}
