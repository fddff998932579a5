//! # Validation Module
//!
//! Structural validation for discount definitions and evaluation requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (discount-api)                                  │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── validate_code / validate_order_amount (THIS MODULE)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog writes (vela-db insert, seed)                        │
//! │  └── validate_discount (THIS MODULE)                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on type/target/status                           │
//! │  └── UNIQUE code                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures are malformed input. A well-formed discount that
//! simply does not apply to a cart is a [`RejectionReason`](crate::RejectionReason),
//! decided by the evaluator.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Discount, DiscountEffect, PercentRate};
use crate::{MAX_AMOUNT, MAX_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a discount code as submitted by a customer or an administrator.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most `MAX_CODE_LENGTH` characters
/// - Letters, digits, hyphens and underscores only
///
/// Codes are case-sensitive; this function never changes case.
///
/// ## Example
/// ```rust
/// use vela_core::validation::validate_code;
///
/// assert!(validate_code("SALE10").is_ok());
/// assert!(validate_code("sale10").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("SALE 10").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a cart amount (order subtotal or a line price).
///
/// ## Rules
/// - Must be non-negative; zero is allowed (free items, empty carts)
/// - At most `MAX_AMOUNT` minor units
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount.minor_units() > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT,
        });
    }

    Ok(())
}

// =============================================================================
// Definition Validators
// =============================================================================

/// Validates a percentage rate.
///
/// ## Rules
/// - Greater than 0 and at most 10000 bps (100%)
pub fn validate_percent_rate(rate: PercentRate) -> ValidationResult<()> {
    if rate.bps() == 0 || rate > PercentRate::FULL {
        return Err(ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: 1,
            max: PercentRate::FULL.bps() as i64,
        });
    }

    Ok(())
}

/// Validates a discount's effect.
///
/// ## Rules
/// - Percentage: rate in (0, 100%], cap positive when set
/// - Fixed: amount positive
pub fn validate_effect(effect: &DiscountEffect) -> ValidationResult<()> {
    match effect {
        DiscountEffect::Percentage { rate, cap } => {
            validate_percent_rate(*rate)?;
            if let Some(cap) = cap {
                if !cap.is_positive() {
                    return Err(ValidationError::MustBePositive {
                        field: "maxDiscountAmount".to_string(),
                    });
                }
            }
        }
        DiscountEffect::Fixed { amount } => {
            if !amount.is_positive() {
                return Err(ValidationError::MustBePositive {
                    field: "amount".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validates a complete discount definition before it is stored.
///
/// ## Rules
/// - Code (when present) passes [`validate_code`]
/// - Effect passes [`validate_effect`]
/// - `start_date <= end_date`
/// - Non-`All` targets carry at least one non-blank value
/// - `usage_limit`, `usage_count` and `min_order_amount` are not negative
/// - The discount is reachable: automatic, or has a code
pub fn validate_discount(discount: &Discount) -> CoreResult<()> {
    if let Some(code) = &discount.code {
        validate_code(code)?;
    }

    if discount.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        }
        .into());
    }

    validate_effect(&discount.effect)?;

    if discount.start_date > discount.end_date {
        return Err(ValidationError::InvalidWindow.into());
    }

    if let Some(values) = discount.target.values() {
        if values.is_empty() || values.iter().any(|v| v.trim().is_empty()) {
            return Err(CoreError::InvalidDiscount {
                id: discount.id,
                reason: format!(
                    "{:?} target requires at least one non-empty value",
                    discount.target.target_type()
                ),
            });
        }
    }

    if let Some(min) = discount.min_order_amount {
        validate_amount("minOrderAmount", min)?;
    }

    if discount.usage_limit.is_some_and(|limit| limit < 0) {
        return Err(ValidationError::MustNotBeNegative {
            field: "usageLimit".to_string(),
        }
        .into());
    }

    if discount.usage_count < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "usageCount".to_string(),
        }
        .into());
    }

    if !discount.is_automatic && discount.code.is_none() {
        return Err(CoreError::InvalidDiscount {
            id: discount.id,
            reason: "a discount without a code must be automatic".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
