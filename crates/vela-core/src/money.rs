//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A percentage discount computed in floats can drift by one unit        │
//! │  between the storefront preview and the checkout total.                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    Every amount is an i64 in the currency's smallest unit.             │
//! │    Percentages are applied with integer math and explicit rounding.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::money::Money;
//! use vela_core::types::PercentRate;
//!
//! let order = Money::from_minor(500_000);
//! let off = order.percentage_of(PercentRate::from_bps(1000)); // 10%
//! assert_eq!(off.minor_units(), 50_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::PercentRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: stacked automatic discounts are summed without a floor,
///   so intermediate totals may exceed the order and callers may subtract
/// - **Single field tuple struct**: serializes as a bare JSON integer
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Cart.order_amount ──┬──► applicable base ──► discount amount          │
/// │  Cart.product_prices ┘                             │                    │
/// │                                                    ▼                    │
/// │  Discount.min_order_amount           Resolution::Applied { amount }    │
/// │  Discount.effect (fixed / cap)                                         │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let price = Money::from_minor(20_000);
    /// assert_eq!(price.minor_units(), 20_000);
    /// ```
    #[inline]
    pub const fn from_minor(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
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

    /// Adds two amounts, clamping at the `i64` bounds instead of wrapping.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    ///
    /// let near_max = Money::from_minor(i64::MAX - 1);
    /// assert_eq!(near_max.saturating_add(Money::from_minor(5)).minor_units(), i64::MAX);
    /// ```
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Computes `rate` percent of this amount, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`, with an i128
    /// intermediate so large order totals cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::money::Money;
    /// use vela_core::types::PercentRate;
    ///
    /// // 12.5% of 999 = 124.875 → 125
    /// let amount = Money::from_minor(999).percentage_of(PercentRate::from_bps(1250));
    /// assert_eq!(amount.minor_units(), 125);
    /// ```
    pub fn percentage_of(&self, rate: PercentRate) -> Money {
        let units = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_minor(units as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount in minor units with thousands separators.
///
/// ## Note
/// For logs and error messages only. Currency formatting is the storefront's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Sums clamp at the `i64` bounds, so a base or a stacked total built from
/// request prices never wraps negative.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Money::saturating_add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(500_000);
        assert_eq!(money.minor_units(), 500_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(500_000).to_string(), "500,000");
        assert_eq!(Money::from_minor(999).to_string(), "999");
        assert_eq!(Money::from_minor(1_000).to_string(), "1,000");
        assert_eq!(Money::from_minor(-25_000).to_string(), "-25,000");
        assert_eq!(Money::zero().to_string(), "0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor_units(), 1500);
        assert_eq!((a - b).minor_units(), 500);

        let mut c = a;
        c += b;
        c -= Money::from_minor(100);
        assert_eq!(c.minor_units(), 1400);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![Money::from_minor(20_000), Money::from_minor(10_000)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.minor_units(), 30_000);

        let empty: Vec<Money> = vec![];
        assert_eq!(empty.into_iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_sum_saturates_instead_of_overflowing() {
        let half = Money::from_minor(i64::MAX / 2 + 10);
        let total: Money = [half, half, half].iter().sum();
        assert_eq!(total.minor_units(), i64::MAX);

        let clamped = Money::from_minor(i64::MIN).saturating_add(Money::from_minor(-1));
        assert_eq!(clamped.minor_units(), i64::MIN);
    }

    #[test]
    fn test_percentage_exact() {
        let order = Money::from_minor(500_000);
        let off = order.percentage_of(PercentRate::from_bps(1000));
        assert_eq!(off.minor_units(), 50_000);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 5% of 10 = 0.5 → 1
        let off = Money::from_minor(10).percentage_of(PercentRate::from_bps(500));
        assert_eq!(off.minor_units(), 1);

        // 5% of 9 = 0.45 → 0
        let off = Money::from_minor(9).percentage_of(PercentRate::from_bps(500));
        assert_eq!(off.minor_units(), 0);
    }

    #[test]
    fn test_percentage_large_amount_does_not_overflow() {
        let huge = Money::from_minor(i64::MAX / 2);
        let all = huge.percentage_of(PercentRate::from_bps(10_000));
        assert_eq!(all, huge);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_minor(-100);
        assert!(negative.is_negative());
        assert!(!negative.is_positive());
    }

    #[test]
    fn test_ordering_supports_min() {
        let cap = Money::from_minor(30_000);
        let raw = Money::from_minor(45_000);
        assert_eq!(raw.min(cap), cap);
    }
}
