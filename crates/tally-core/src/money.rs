//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In JavaScript/floating point:                                      │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: Integer Cents                                        │
//! │    Every amount is an i64 number of cents. Sums over thousands of   │
//! │    expenses stay exact; only display code converts to decimals.     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let lunch = Money::from_cents(1250); // $12.50
//! let coffee = Money::from_cents(475); // $4.75
//! assert_eq!((lunch + coffee).cents(), 1725);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections and deltas
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support so amounts round-trip through the
///   storage record and remote payloads as plain integers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Saturating subtraction clamped at zero.
    ///
    /// Used for "remaining budget" style calculations where an overspent
    /// budget reports zero remaining rather than a negative amount.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let budget = Money::from_cents(10_000);
    /// let spent = Money::from_cents(11_000);
    /// assert_eq!(budget.remaining_after(spent), Money::zero());
    /// ```
    #[inline]
    pub const fn remaining_after(&self, spent: Money) -> Self {
        let diff = self.0 - spent.0;
        if diff < 0 {
            Money(0)
        } else {
            Money(diff)
        }
    }

    /// Divides evenly by a count, truncating toward zero.
    ///
    /// A zero count yields zero (callers pass collection sizes).
    #[inline]
    pub const fn divided_by(&self, count: i64) -> Self {
        if count == 0 {
            Money(0)
        } else {
            Money(self.0 / count)
        }
    }

    /// Renders the amount as a plain 2-decimal string, e.g. `12.50`.
    ///
    /// This is the wire format used by the CSV export.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable dollar format.
/// Use [`format_currency`] for currency-aware display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Formats an amount for display in the given ISO currency code.
///
/// Common codes get their symbol; anything else falls back to
/// `CODE amount` (e.g. `CHF 12.50`).
///
/// ## Example
/// ```rust
/// use tally_core::money::{format_currency, Money};
///
/// assert_eq!(format_currency(Money::from_cents(1250), "USD"), "$12.50");
/// assert_eq!(format_currency(Money::from_cents(1250), "EUR"), "€12.50");
/// assert_eq!(format_currency(Money::from_cents(1250), "CHF"), "CHF 12.50");
/// ```
pub fn format_currency(amount: Money, currency: &str) -> String {
    let sign = if amount.is_negative() { "-" } else { "" };
    let value = format!("{}.{:02}", amount.major().abs(), amount.minor());
    match currency {
        "USD" | "CAD" | "AUD" => format!("{sign}${value}"),
        "EUR" => format!("{sign}€{value}"),
        "GBP" => format!("{sign}£{value}"),
        "JPY" => format!("{sign}¥{value}"),
        "INR" => format!("{sign}₹{value}"),
        other => format!("{sign}{other} {value}"),
    }
}

/// Parses a human-entered amount string ("$1,234.56") into Money.
///
/// Strips everything except digits, sign, and the decimal point, then reads
/// up to two decimal places. Unparseable input yields `None`; the caller
/// decides whether that is a validation error or a zero default.
pub fn parse_amount(value: &str) -> Option<Money> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    let negative = cleaned.starts_with('-');
    let unsigned = cleaned.trim_start_matches('-');

    let (major_str, minor_str) = match unsigned.split_once('.') {
        Some((m, rest)) => (m, rest),
        None => (unsigned, ""),
    };
    // A second decimal point means garbage input.
    if minor_str.contains('.') {
        return None;
    }

    let major: i64 = if major_str.is_empty() {
        0
    } else {
        major_str.parse().ok()?
    };
    let minor: i64 = match minor_str.len() {
        0 => 0,
        1 => minor_str.parse::<i64>().ok()? * 10,
        _ => minor_str[..2].parse().ok()?,
    };

    let cents = major * 100 + minor;
    Some(Money::from_cents(if negative { -cents } else { cents }))
}

// =============================================================================
// Unit Tests
// =============================================================================
