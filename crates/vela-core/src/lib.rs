//! # vela-core: Pure Discount Logic for Vela Storefront
//!
//! This crate is the **heart** of the Vela discount engine. It decides which
//! discounts apply to a cart and what they are worth, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Vela Discount Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront (cart, checkout)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  discount-api (axum)                            │   │
//! │  │    /discounts/automatic, /discounts/validate, /health           │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │ lookups (with timeout)       │                        │
//! │  ┌──────────────▼──────────────┐   ┌───────────▼─────────────────────┐ │
//! │  │  vela-db (catalog reads)    │   │  ★ vela-core (THIS CRATE) ★     │ │
//! │  │  SQLite, migrations         │   │                                 │ │
//! │  └─────────────────────────────┘   │  types  money  eligibility      │ │
//! │                                    │  evaluator  validation          │ │
//! │                                    │                                 │ │
//! │                                    │  NO I/O • NO CLOCK • PURE       │ │
//! │                                    └─────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Discount, CartContext, effects, targets)
//! - [`money`] - Money type with integer arithmetic
//! - [`eligibility`] - Per-discount checks and amount computation
//! - [`evaluator`] - Manual and automatic evaluation, resolution
//! - [`error`] - Rejection reasons and domain errors
//! - [`validation`] - Structural rules for definitions and requests
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the evaluation instant is an argument, never read from the clock
//! 2. **No I/O**: the caller loads discounts and passes the results in
//! 3. **Integer Money**: amounts are minor units (i64), rates are basis points
//! 4. **Rejections Are Values**: a discount that does not apply is a normal result
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use vela_core::evaluator::{CandidateLookup, CodeLookup, DiscountEvaluator};
//! use vela_core::{
//!     CartContext, Discount, DiscountEffect, DiscountSource, DiscountStatus, DiscountTarget,
//!     Money, PercentRate,
//! };
//!
//! let now = Utc::now();
//! let sale10 = Discount {
//!     id: 1,
//!     code: Some("SALE10".to_string()),
//!     name: "10% off".to_string(),
//!     start_date: now - Duration::days(1),
//!     end_date: now + Duration::days(1),
//!     effect: DiscountEffect::Percentage { rate: PercentRate::from_bps(1000), cap: None },
//!     target: DiscountTarget::All,
//!     min_order_amount: None,
//!     is_first_purchase_only: false,
//!     is_automatic: false,
//!     usage_limit: None,
//!     usage_count: 0,
//!     status: DiscountStatus::Active,
//!     priority: None,
//! };
//!
//! let cart = CartContext::new(Money::from_minor(500_000));
//! let evaluation = DiscountEvaluator::at(now).evaluate(
//!     Some(("SALE10", CodeLookup::Found(sale10))),
//!     CandidateLookup::Loaded(vec![]),
//!     &cart,
//! );
//!
//! assert_eq!(evaluation.resolution.source(), Some(DiscountSource::Manual));
//! assert_eq!(evaluation.resolution.amount(), Money::from_minor(50_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod eligibility;
pub mod error;
pub mod evaluator;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::Money` instead of
// `use vela_core::money::Money`

pub use eligibility::AppliedDiscount;
pub use error::{CoreError, CoreResult, RejectionReason, ValidationError};
pub use evaluator::{
    AutomaticOutcome, CandidateLookup, CodeLookup, DiscountEvaluator, Evaluation, ManualOutcome,
    Resolution,
};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a discount code, in characters.
pub const MAX_CODE_LENGTH: usize = 50;

/// Largest amount, in minor units, accepted for an order or a line price.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;
