//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  ├── RejectionReason  - Why a discount does not apply (NOT a failure)  │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Malformed discount definitions or requests     │
//! │                                                                         │
//! │  vela-db errors (separate crate)                                       │
//! │  └── DbError          - Catalog read failures                          │
//! │                                                                         │
//! │  HTTP errors (discount-api)                                            │
//! │  └── ApiError         - Only for malformed requests (400)              │
//! │                                                                         │
//! │  Rejections become `valid: false` responses. They never abort checkout.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Rejection Reason
// =============================================================================

/// Why a discount did not apply to a cart.
///
/// Checks run in a fixed order and stop at the first failure, so a single
/// evaluation reports exactly one reason per discount.
///
/// ## User Workflow
/// ```text
/// Customer enters "SALE10"
///      │
///      ▼
/// status active? ── no ──► Inactive / Expired
///      │
///      ▼
/// within window? ── no ──► NotYetActive / Expired
///      │
///      ▼
/// usage left? ───── no ──► UsageLimitReached
///      │
///      ▼
/// order >= minimum? no ──► MinimumOrderNotMet { required }
///      │
///      ▼
/// first purchase? ─ no ──► FirstPurchaseOnly
///      │
///      ▼
/// targets cart? ─── no ──► CustomerNotEligible / NoApplicableItems
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// No discount has this code.
    #[error("Discount code not found")]
    NotFound,

    /// Disabled by an administrator.
    #[error("Discount code is not active")]
    Inactive,

    /// Before `start_date`.
    #[error("Discount code is not yet active")]
    NotYetActive,

    /// After `end_date`, or marked expired by an administrator.
    #[error("Discount code has expired")]
    Expired,

    #[error("Discount code has reached its usage limit")]
    UsageLimitReached,

    #[error("Order amount must be at least {required} to use this discount")]
    MinimumOrderNotMet { required: Money },

    #[error("Discount code is only valid for a first purchase")]
    FirstPurchaseOnly,

    /// No cart line intersects the discount's products or categories.
    #[error("Discount code does not apply to any product in the cart")]
    NoApplicableItems,

    #[error("Discount code is not available for this customer")]
    CustomerNotEligible,

    /// The catalog could not be read (unreachable or timed out).
    #[error("Could not validate discount code, please try again")]
    CatalogUnavailable,
}

impl RejectionReason {
    /// Stable machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::NotFound => "NOT_FOUND",
            RejectionReason::Inactive => "INACTIVE",
            RejectionReason::NotYetActive => "NOT_YET_ACTIVE",
            RejectionReason::Expired => "EXPIRED",
            RejectionReason::UsageLimitReached => "USAGE_LIMIT_REACHED",
            RejectionReason::MinimumOrderNotMet { .. } => "MINIMUM_ORDER_NOT_MET",
            RejectionReason::FirstPurchaseOnly => "FIRST_PURCHASE_ONLY",
            RejectionReason::NoApplicableItems => "NO_APPLICABLE_ITEMS",
            RejectionReason::CustomerNotEligible => "CUSTOMER_NOT_ELIGIBLE",
            RejectionReason::CatalogUnavailable => "CATALOG_UNAVAILABLE",
        }
    }

    /// True for the transient catalog failure; retrying may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RejectionReason::CatalogUnavailable)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A discount definition breaks a structural invariant.
    #[error("Invalid discount {id}: {reason}")]
    InvalidDiscount { id: i64, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a discount definition or an evaluation request is
/// malformed. Unlike [`RejectionReason`], they indicate a programmer or
/// administrator mistake.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., code with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// `start_date` is after `end_date`.
    #[error("start date must not be after end date")]
    InvalidWindow,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_distinguish_inactive_and_expired() {
        assert_eq!(
            RejectionReason::Inactive.to_string(),
            "Discount code is not active"
        );
        assert_eq!(
            RejectionReason::Expired.to_string(),
            "Discount code has expired"
        );
        assert_ne!(RejectionReason::Inactive.code(), RejectionReason::Expired.code());
    }

    #[test]
    fn test_minimum_order_message_includes_amount() {
        let reason = RejectionReason::MinimumOrderNotMet {
            required: Money::from_minor(300_000),
        };
        assert_eq!(
            reason.to_string(),
            "Order amount must be at least 300,000 to use this discount"
        );
        assert_eq!(reason.code(), "MINIMUM_ORDER_NOT_MET");
    }

    #[test]
    fn test_only_catalog_failure_is_transient() {
        assert!(RejectionReason::CatalogUnavailable.is_transient());
        assert!(!RejectionReason::NotFound.is_transient());
        assert!(!RejectionReason::UsageLimitReached.is_transient());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: 1,
            max: 10000,
        };
        assert_eq!(err.to_string(), "percentage must be between 1 and 10000");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::InvalidWindow.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
