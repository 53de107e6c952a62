//! # tally-core: Pure Calculation Library for Tally
//!
//! This crate is the **heart** of Tally. It contains the expense tracker's
//! domain model and every derivation rule as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Tally Architecture                           │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  UI layer (out of scope)                      │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │          tally-store: observable stores + persistence         │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                  │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │               ★ tally-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌────────┐ ┌───────┐ ┌───────┐ ┌────────┐ ┌──────────────┐ │ │
//! │  │  │ types  │ │ money │ │ stats │ │ filter │ │ budget/dates │ │ │
//! │  │  └────────┘ └───────┘ └───────┘ └────────┘ └──────────────┘ │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Expense, Category, Budget, preferences)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`dates`] - Calendar bucketing and date formatting
//! - [`ids`] - Entity id generation
//! - [`stats`] - Expense statistics and category aggregation
//! - [`filter`] - Search, sort, and filter pipeline
//! - [`budget`] - Budget progress math
//! - [`validation`] - Entity validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every derivation takes its inputs (including
//!    "now") explicitly and returns a fresh value
//! 2. **No I/O**: database, network, and file access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **Defensive Defaults**: bad or empty input yields zeroed results,
//!    never an error or panic

// =============================================================================
// Module Declarations
// =============================================================================

pub mod budget;
pub mod dates;
pub mod error;
pub mod filter;
pub mod ids;
pub mod money;
pub mod stats;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// User id assigned to records created before any account signs in.
///
/// Sync rewrites it to the authenticated user's id at push time, so a
/// local-first dataset uploads cleanly once the user authenticates.
pub const LOCAL_USER_ID: &str = "local";
