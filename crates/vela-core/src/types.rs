//! # Domain Types
//!
//! Core domain types used throughout the discount engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Discount     │   │ DiscountEffect  │   │ DiscountTarget  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  Percentage     │   │  All            │       │
//! │  │  code (opt)     │──►│   rate, cap     │   │  Products(ids)  │       │
//! │  │  window         │   │  Fixed          │   │  Categories(..) │       │
//! │  │  status         │   │   amount        │   │  Customers(ids) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PercentRate   │   │ DiscountStatus  │   │  CartContext    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Active         │   │  product ids    │       │
//! │  │  1000 = 10%     │   │  Inactive       │   │  prices, cats   │       │
//! │  └─────────────────┘   │  Expired        │   │  customer, total│       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tagged Targets
//! A discount's target and its id/name set travel together in one enum
//! variant, so a `Products` discount always carries product ids and an
//! `All` discount can never carry an orphaned list.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Percent Rate
// =============================================================================

/// Percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 10000 bps = 100%.
/// Fractional percentages such as 12.5% (1250 bps) are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PercentRate(u32);

impl PercentRate {
    /// 100%.
    pub const FULL: PercentRate = PercentRate(10_000);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        PercentRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Discount Status
// =============================================================================

/// Administrator-controlled flag, independent of the date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountStatus {
    Active,
    Inactive,
    Expired,
}

impl Default for DiscountStatus {
    fn default() -> Self {
        DiscountStatus::Active
    }
}

// =============================================================================
// Storage Discriminants
// =============================================================================

/// The `type` column of a stored discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

/// The `target_type` column of a stored discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    All,
    Products,
    Categories,
    Customers,
}

// =============================================================================
// Effect and Target
// =============================================================================

/// What a discount takes off once its applicable base is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountEffect {
    /// `rate` of the applicable base, optionally capped at `cap`.
    Percentage {
        rate: PercentRate,
        cap: Option<Money>,
    },
    /// A flat amount, never more than the applicable base.
    Fixed { amount: Money },
}

impl DiscountEffect {
    /// Returns the storage discriminant.
    pub fn kind(&self) -> DiscountKind {
        match self {
            DiscountEffect::Percentage { .. } => DiscountKind::Percentage,
            DiscountEffect::Fixed { .. } => DiscountKind::Fixed,
        }
    }
}

/// Which part of the order a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "targetType", content = "values", rename_all = "snake_case")]
pub enum DiscountTarget {
    /// The whole order.
    All,
    /// Cart lines whose product id is in the set.
    Products(BTreeSet<String>),
    /// Cart lines whose category is in the set.
    Categories(BTreeSet<String>),
    /// The whole order, for the listed customers only.
    Customers(BTreeSet<String>),
}

impl DiscountTarget {
    /// Returns the storage discriminant.
    pub fn target_type(&self) -> TargetType {
        match self {
            DiscountTarget::All => TargetType::All,
            DiscountTarget::Products(_) => TargetType::Products,
            DiscountTarget::Categories(_) => TargetType::Categories,
            DiscountTarget::Customers(_) => TargetType::Customers,
        }
    }

    /// Returns the id/name set, or `None` for `All`.
    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            DiscountTarget::All => None,
            DiscountTarget::Products(set)
            | DiscountTarget::Categories(set)
            | DiscountTarget::Customers(set) => Some(set),
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A discount definition as read from the catalog.
///
/// Read-only from the engine's perspective. `usage_count` is advanced by the
/// order-completion process, never by evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: i64,

    /// Case-sensitive code. `None` for automatic-only discounts.
    pub code: Option<String>,

    /// Display label.
    pub name: String,

    /// First instant the discount is usable (inclusive).
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,

    /// Last instant the discount is usable (inclusive).
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,

    pub effect: DiscountEffect,

    pub target: DiscountTarget,

    /// Order subtotal floor.
    pub min_order_amount: Option<Money>,

    pub is_first_purchase_only: bool,

    /// Applies without a code when eligible.
    pub is_automatic: bool,

    /// Ceiling on total redemptions.
    pub usage_limit: Option<i64>,

    pub usage_count: i64,

    pub status: DiscountStatus,

    /// Higher sorts first among reported automatic discounts.
    pub priority: Option<i32>,
}

impl Discount {
    /// True once `usage_count` has reached `usage_limit`.
    pub fn is_exhausted(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.usage_count >= limit,
            None => false,
        }
    }

    /// True if `now` falls within `[start_date, end_date]`.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

// =============================================================================
// Discount Source
// =============================================================================

/// Where an applied discount came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountSource {
    /// A code the customer entered.
    Manual,
    /// One or more discounts applied without a code.
    Automatic,
}

// =============================================================================
// Cart Context
// =============================================================================

/// The cart facts an evaluation reads.
///
/// ## Builder Usage
/// ```rust
/// use vela_core::{CartContext, Money};
///
/// let cart = CartContext::new(Money::from_minor(200_000))
///     .with_product("tee-01", Money::from_minor(120_000))
///     .with_product("cap-02", Money::from_minor(80_000))
///     .with_customer("cust-7");
///
/// assert_eq!(cart.product_ids.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContext {
    /// Product ids in cart order.
    pub product_ids: Vec<String>,

    /// Line subtotal per product id. `None` when the caller sent no prices.
    pub product_prices: Option<HashMap<String, Money>>,

    /// Category per product id. `None` when the caller sent no mapping.
    pub product_categories: Option<HashMap<String, String>>,

    /// Cart-level category labels.
    pub category_names: Vec<String>,

    pub customer_id: Option<String>,

    pub is_first_purchase: bool,

    /// Order subtotal.
    pub order_amount: Money,
}

impl CartContext {
    /// Creates an empty cart with the given subtotal.
    pub fn new(order_amount: Money) -> Self {
        CartContext {
            order_amount,
            ..Default::default()
        }
    }

    /// Adds a product line with its price.
    pub fn with_product(mut self, product_id: impl Into<String>, price: Money) -> Self {
        let product_id = product_id.into();
        self.product_prices
            .get_or_insert_with(HashMap::new)
            .insert(product_id.clone(), price);
        self.product_ids.push(product_id);
        self
    }

    /// Adds a product line without a price.
    pub fn with_unpriced_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_ids.push(product_id.into());
        self
    }

    /// Records the category of a product already in the cart.
    pub fn with_product_category(
        mut self,
        product_id: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        self.product_categories
            .get_or_insert_with(HashMap::new)
            .insert(product_id.into(), category.into());
        self
    }

    /// Adds a cart-level category label.
    pub fn with_category_name(mut self, category: impl Into<String>) -> Self {
        self.category_names.push(category.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn first_purchase(mut self, is_first_purchase: bool) -> Self {
        self.is_first_purchase = is_first_purchase;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(usage_limit: Option<i64>, usage_count: i64) -> Discount {
        Discount {
            id: 1,
            code: Some("SALE10".to_string()),
            name: "Sale".to_string(),
            start_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap(),
            effect: DiscountEffect::Percentage {
                rate: PercentRate::from_bps(1000),
                cap: None,
            },
            target: DiscountTarget::All,
            min_order_amount: None,
            is_first_purchase_only: false,
            is_automatic: false,
            usage_limit,
            usage_count,
            status: DiscountStatus::Active,
            priority: None,
        }
    }

    #[test]
    fn test_percent_rate_is_basis_points() {
        assert_eq!(PercentRate::from_bps(1250).bps(), 1250);
        assert_eq!(PercentRate::FULL.bps(), 10_000);
        assert!(PercentRate::from_bps(10_001) > PercentRate::FULL);
    }

    #[test]
    fn test_exhausted() {
        assert!(!sample(None, 1_000).is_exhausted());
        assert!(!sample(Some(5), 4).is_exhausted());
        assert!(sample(Some(5), 5).is_exhausted());
        assert!(sample(Some(0), 0).is_exhausted());
    }

    #[test]
    fn test_window_is_inclusive() {
        let discount = sample(None, 0);
        assert!(discount.is_within_window(discount.start_date));
        assert!(discount.is_within_window(discount.end_date));
        assert!(!discount.is_within_window(discount.end_date + chrono::Duration::seconds(1)));
        assert!(!discount.is_within_window(discount.start_date - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_target_discriminants() {
        let ids: BTreeSet<String> = ["p1".to_string()].into_iter().collect();
        assert_eq!(DiscountTarget::All.target_type(), TargetType::All);
        assert!(DiscountTarget::All.values().is_none());
        let target = DiscountTarget::Products(ids.clone());
        assert_eq!(target.target_type(), TargetType::Products);
        assert_eq!(target.values(), Some(&ids));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample(Some(10), 2)).unwrap();
        assert_eq!(json["code"], "SALE10");
        assert_eq!(json["effect"]["type"], "percentage");
        assert_eq!(json["effect"]["rate"], 1000);
        assert_eq!(json["target"]["targetType"], "all");
        assert_eq!(json["status"], "active");
        assert_eq!(json["usageLimit"], 10);
    }

    #[test]
    fn test_cart_builder() {
        let cart = CartContext::new(Money::from_minor(300))
            .with_product("a", Money::from_minor(100))
            .with_unpriced_product("b")
            .with_product_category("a", "shoes")
            .with_customer("c1")
            .first_purchase(true);

        assert_eq!(cart.product_ids, vec!["a".to_string(), "b".to_string()]);
        let prices = cart.product_prices.as_ref().unwrap();
        assert_eq!(prices.get("a"), Some(&Money::from_minor(100)));
        assert!(prices.get("b").is_none());
        assert_eq!(
            cart.product_categories.as_ref().unwrap().get("a").map(String::as_str),
            Some("shoes")
        );
        assert_eq!(cart.customer_id.as_deref(), Some("c1"));
        assert!(cart.is_first_purchase);
    }
}
