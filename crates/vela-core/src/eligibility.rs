//! # Eligibility Module
//!
//! Decides whether a single discount applies to a cart and, if so, what it
//! is worth. Shared by the manual and automatic paths of the evaluator.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_eligibility(discount, cart, now)                                 │
//! │                                                                         │
//! │  1. status == active            else Inactive / Expired                │
//! │  2. start <= now <= end         else NotYetActive / Expired            │
//! │  3. usage_count < usage_limit   else UsageLimitReached                 │
//! │  4. order >= min_order_amount   else MinimumOrderNotMet                │
//! │  5. first purchase (if needed)  else FirstPurchaseOnly                 │
//! │  6. applicable_base(target)     else CustomerNotEligible /             │
//! │                                      NoApplicableItems                 │
//! │  7. discount_amount(effect, base)                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::error::RejectionReason;
use crate::money::Money;
use crate::types::{CartContext, Discount, DiscountEffect, DiscountStatus, DiscountTarget};

/// The part of the order a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicableBase {
    /// Amount the effect is computed against.
    pub amount: Money,

    /// Cart products the discount matched, in cart order. `None` when the
    /// discount applies to the order as a whole.
    pub products: Option<Vec<String>>,
}

impl ApplicableBase {
    fn whole_order(cart: &CartContext) -> Self {
        ApplicableBase {
            amount: cart.order_amount,
            products: None,
        }
    }
}

/// A discount that passed every check, with its computed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub discount: Discount,
    pub applicable_base: Money,
    pub amount: Money,
    pub applied_to_products: Option<Vec<String>>,
}

/// Runs every check in order and computes the discount amount.
///
/// ## Returns
/// * `Ok(AppliedDiscount)` - the discount applies
/// * `Err(RejectionReason)` - the first check that failed
pub fn check_eligibility(
    discount: &Discount,
    cart: &CartContext,
    now: DateTime<Utc>,
) -> Result<AppliedDiscount, RejectionReason> {
    match discount.status {
        DiscountStatus::Active => {}
        DiscountStatus::Inactive => return Err(RejectionReason::Inactive),
        DiscountStatus::Expired => return Err(RejectionReason::Expired),
    }

    if now < discount.start_date {
        return Err(RejectionReason::NotYetActive);
    }
    if now > discount.end_date {
        return Err(RejectionReason::Expired);
    }

    if discount.is_exhausted() {
        return Err(RejectionReason::UsageLimitReached);
    }

    if let Some(required) = discount.min_order_amount {
        if cart.order_amount < required {
            return Err(RejectionReason::MinimumOrderNotMet { required });
        }
    }

    if discount.is_first_purchase_only && !cart.is_first_purchase {
        return Err(RejectionReason::FirstPurchaseOnly);
    }

    let base = applicable_base(&discount.target, cart)?;
    let amount = discount_amount(&discount.effect, base.amount);

    Ok(AppliedDiscount {
        discount: discount.clone(),
        applicable_base: base.amount,
        amount,
        applied_to_products: base.products,
    })
}

/// Computes the applicable base for a target.
///
/// A products or categories target that matches nothing, or matches only
/// zero-priced lines, is a rejection rather than a zero-value success.
pub fn applicable_base(
    target: &DiscountTarget,
    cart: &CartContext,
) -> Result<ApplicableBase, RejectionReason> {
    match target {
        DiscountTarget::All => Ok(ApplicableBase::whole_order(cart)),

        DiscountTarget::Customers(ids) => match &cart.customer_id {
            Some(customer) if ids.contains(customer) => Ok(ApplicableBase::whole_order(cart)),
            _ => Err(RejectionReason::CustomerNotEligible),
        },

        DiscountTarget::Products(ids) => {
            let matched = matching_products(cart, |product_id| ids.contains(product_id));
            priced_base(cart, matched)
        }

        DiscountTarget::Categories(names) => match &cart.product_categories {
            Some(categories) => {
                let matched = matching_products(cart, |product_id| {
                    categories
                        .get(product_id)
                        .is_some_and(|category| names.contains(category))
                });
                priced_base(cart, matched)
            }
            None => {
                if intersects(names, &cart.category_names) {
                    Ok(ApplicableBase::whole_order(cart))
                } else {
                    Err(RejectionReason::NoApplicableItems)
                }
            }
        },
    }
}

/// Applies an effect to a base.
///
/// - Percentage: `base × rate`, rounded half up, then capped
/// - Fixed: never more than the base
pub fn discount_amount(effect: &DiscountEffect, base: Money) -> Money {
    match effect {
        DiscountEffect::Percentage { rate, cap } => {
            let raw = base.percentage_of(*rate);
            match cap {
                Some(cap) => raw.min(*cap),
                None => raw,
            }
        }
        DiscountEffect::Fixed { amount } => (*amount).min(base),
    }
}

/// Cart products accepted by `pred`, in cart order, without duplicates.
fn matching_products(cart: &CartContext, pred: impl Fn(&str) -> bool) -> Vec<String> {
    let mut seen = HashSet::new();
    cart.product_ids
        .iter()
        .filter(|id| pred(id.as_str()))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Sums the prices of matched products.
///
/// When the cart carries no prices at all, the whole order is the base.
/// Matched products with no price entry contribute nothing.
fn priced_base(cart: &CartContext, matched: Vec<String>) -> Result<ApplicableBase, RejectionReason> {
    if matched.is_empty() {
        return Err(RejectionReason::NoApplicableItems);
    }

    let amount = match &cart.product_prices {
        Some(prices) => matched
            .iter()
            .filter_map(|id| prices.get(id))
            .sum(),
        None => cart.order_amount,
    };

    if !amount.is_positive() {
        return Err(RejectionReason::NoApplicableItems);
    }

    Ok(ApplicableBase {
        amount,
        products: Some(matched),
    })
}

fn intersects(set: &BTreeSet<String>, values: &[String]) -> bool {
    values.iter().any(|value| set.contains(value))
}

// =============================================================================
// Unit Tests
// =============================================================================
