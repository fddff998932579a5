//! # Evaluator Module
//!
//! Turns catalog lookups and a cart into a single discount decision.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CodeLookup ─────► evaluate_manual ─────► ManualOutcome                │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                                           resolve ──► Resolution        │
//! │                                               ▲                         │
//! │  CandidateLookup ─► evaluate_automatic ─► AutomaticOutcome             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator never touches the catalog. The caller performs the reads
//! (with whatever timeout it likes) and hands in the results, including the
//! "could not read" case. Evaluation time is also an input, so the same
//! inputs always produce the same [`Evaluation`].
//!
//! ## Manual vs Automatic
//! Automatic discounts stack: every eligible one applies and their amounts
//! are summed. A manual code competes against that sum as a whole. The code
//! wins only if it is strictly larger; a tie goes to the automatic set.

use chrono::{DateTime, Utc};

use crate::eligibility::{check_eligibility, AppliedDiscount};
use crate::error::RejectionReason;
use crate::money::Money;
use crate::types::{CartContext, Discount, DiscountSource};

// =============================================================================
// Inputs
// =============================================================================

/// Result of looking a code up in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    Found(Discount),
    NotFound,
    /// The catalog was unreachable or did not answer in time.
    Unavailable,
}

/// Result of listing automatic candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateLookup {
    Loaded(Vec<Discount>),
    Unavailable,
}

// =============================================================================
// Outcomes
// =============================================================================

/// What happened to a submitted code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualOutcome {
    Accepted(AppliedDiscount),
    Rejected {
        code: String,
        reason: RejectionReason,
    },
}

impl ManualOutcome {
    /// Discount amount if accepted, zero otherwise.
    pub fn amount(&self) -> Money {
        match self {
            ManualOutcome::Accepted(applied) => applied.amount,
            ManualOutcome::Rejected { .. } => Money::zero(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ManualOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            ManualOutcome::Accepted(_) => None,
            ManualOutcome::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Every automatic discount that applies, plus the ones that did not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutomaticOutcome {
    /// Priority descending (unset last), then id ascending.
    pub applied: Vec<AppliedDiscount>,

    /// Sum of `applied` amounts. Not floored at the order amount.
    pub total: Money,

    /// Candidates that failed a check, with the first failing reason.
    pub skipped: Vec<(i64, RejectionReason)>,

    /// True when the candidate list could not be read.
    pub catalog_unavailable: bool,
}

impl AutomaticOutcome {
    fn unavailable() -> Self {
        AutomaticOutcome {
            catalog_unavailable: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Which side supplies the discount for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied { source: DiscountSource, amount: Money },
    None,
}

impl Resolution {
    pub fn source(&self) -> Option<DiscountSource> {
        match self {
            Resolution::Applied { source, .. } => Some(*source),
            Resolution::None => None,
        }
    }

    /// The discount the order receives; zero for [`Resolution::None`].
    pub fn amount(&self) -> Money {
        match self {
            Resolution::Applied { amount, .. } => *amount,
            Resolution::None => Money::zero(),
        }
    }
}

/// Full result of evaluating a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// `None` when no code was submitted.
    pub manual: Option<ManualOutcome>,
    pub automatic: AutomaticOutcome,
    pub resolution: Resolution,
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates discounts as of a fixed instant.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use vela_core::evaluator::{CandidateLookup, DiscountEvaluator, Resolution};
/// use vela_core::{CartContext, Money};
///
/// let cart = CartContext::new(Money::from_minor(100_000));
/// let evaluator = DiscountEvaluator::at(Utc::now());
///
/// let evaluation = evaluator.evaluate(None, CandidateLookup::Loaded(vec![]), &cart);
/// assert_eq!(evaluation.resolution, Resolution::None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DiscountEvaluator {
    now: DateTime<Utc>,
}

impl DiscountEvaluator {
    pub fn at(now: DateTime<Utc>) -> Self {
        DiscountEvaluator { now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Checks a single discount against the cart.
    pub fn check(
        &self,
        discount: &Discount,
        cart: &CartContext,
    ) -> Result<AppliedDiscount, RejectionReason> {
        check_eligibility(discount, cart, self.now)
    }

    /// Evaluates a submitted code.
    ///
    /// A found discount whose stored code differs from `code` (the catalog
    /// should never return one) is treated as not found.
    pub fn evaluate_manual(
        &self,
        code: &str,
        lookup: CodeLookup,
        cart: &CartContext,
    ) -> ManualOutcome {
        let result = match lookup {
            CodeLookup::Unavailable => Err(RejectionReason::CatalogUnavailable),
            CodeLookup::NotFound => Err(RejectionReason::NotFound),
            CodeLookup::Found(discount) if discount.code.as_deref() != Some(code) => {
                Err(RejectionReason::NotFound)
            }
            CodeLookup::Found(discount) => self.check(&discount, cart),
        };

        match result {
            Ok(applied) => ManualOutcome::Accepted(applied),
            Err(reason) => ManualOutcome::Rejected {
                code: code.to_string(),
                reason,
            },
        }
    }

    /// Evaluates every automatic candidate and stacks the eligible ones.
    ///
    /// Candidates not flagged automatic are skipped as not found, so a
    /// loosely filtered list cannot leak code-only discounts.
    pub fn evaluate_automatic(
        &self,
        lookup: CandidateLookup,
        cart: &CartContext,
    ) -> AutomaticOutcome {
        let candidates = match lookup {
            CandidateLookup::Loaded(candidates) => candidates,
            CandidateLookup::Unavailable => return AutomaticOutcome::unavailable(),
        };

        let mut outcome = AutomaticOutcome::default();
        for discount in &candidates {
            if !discount.is_automatic {
                outcome.skipped.push((discount.id, RejectionReason::NotFound));
                continue;
            }
            match self.check(discount, cart) {
                Ok(applied) => outcome.applied.push(applied),
                Err(reason) => outcome.skipped.push((discount.id, reason)),
            }
        }

        outcome.applied.sort_by(|a, b| {
            let a_priority = a.discount.priority.unwrap_or(i32::MIN);
            let b_priority = b.discount.priority.unwrap_or(i32::MIN);
            b_priority
                .cmp(&a_priority)
                .then_with(|| a.discount.priority.is_none().cmp(&b.discount.priority.is_none()))
                .then_with(|| a.discount.id.cmp(&b.discount.id))
        });
        outcome.total = outcome.applied.iter().map(|applied| applied.amount).sum();
        outcome
    }

    /// Runs both paths and resolves them.
    ///
    /// `manual` is the submitted code with its lookup, or `None` when the
    /// customer entered no code.
    pub fn evaluate(
        &self,
        manual: Option<(&str, CodeLookup)>,
        candidates: CandidateLookup,
        cart: &CartContext,
    ) -> Evaluation {
        let manual = manual.map(|(code, lookup)| self.evaluate_manual(code, lookup, cart));
        let automatic = self.evaluate_automatic(candidates, cart);
        let resolution = resolve(manual.as_ref(), &automatic);

        Evaluation {
            manual,
            automatic,
            resolution,
        }
    }
}

/// Picks the better of an accepted code and the automatic set.
///
/// ## Rules
/// - Accepted code strictly larger than the automatic total: manual
/// - Otherwise, any automatic discount applied: automatic
/// - Otherwise, accepted code (it can only be worth zero here): manual
/// - Otherwise: none
pub fn resolve(manual: Option<&ManualOutcome>, automatic: &AutomaticOutcome) -> Resolution {
    let accepted = manual.filter(|outcome| outcome.is_accepted());

    match accepted {
        Some(outcome) if outcome.amount() > automatic.total || automatic.is_empty() => {
            Resolution::Applied {
                source: DiscountSource::Manual,
                amount: outcome.amount(),
            }
        }
        _ if !automatic.is_empty() => Resolution::Applied {
            source: DiscountSource::Automatic,
            amount: automatic.total,
        },
        _ => Resolution::None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountEffect, DiscountStatus, DiscountTarget, PercentRate};
    use chrono::{Duration, TimeZone};
    use std::collections::BTreeSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn evaluator() -> DiscountEvaluator {
        DiscountEvaluator::at(now())
    }

    fn base(id: i64, code: Option<&str>, effect: DiscountEffect) -> Discount {
        Discount {
            id,
            code: code.map(str::to_string),
            name: format!("Discount {}", id),
            start_date: now() - Duration::days(30),
            end_date: now() + Duration::days(30),
            effect,
            target: DiscountTarget::All,
            min_order_amount: None,
            is_first_purchase_only: false,
            is_automatic: false,
            usage_limit: None,
            usage_count: 0,
            status: DiscountStatus::Active,
            priority: None,
        }
    }

    fn percent_code(id: i64, code: &str, bps: u32) -> Discount {
        base(
            id,
            Some(code),
            DiscountEffect::Percentage {
                rate: PercentRate::from_bps(bps),
                cap: None,
            },
        )
    }

    fn fixed_code(id: i64, code: &str, amount: i64) -> Discount {
        base(
            id,
            Some(code),
            DiscountEffect::Fixed {
                amount: Money::from_minor(amount),
            },
        )
    }

    fn automatic(mut discount: Discount, priority: Option<i32>) -> Discount {
        discount.is_automatic = true;
        discount.priority = priority;
        discount
    }

    fn cart(amount: i64) -> CartContext {
        CartContext::new(Money::from_minor(amount))
    }

    #[test]
    fn test_manual_percentage_accepted() {
        let outcome = evaluator().evaluate_manual(
            "SALE10",
            CodeLookup::Found(percent_code(1, "SALE10", 1000)),
            &cart(500_000),
        );
        assert!(outcome.is_accepted());
        assert_eq!(outcome.amount(), Money::from_minor(50_000));
    }

    #[test]
    fn test_manual_expired_code() {
        let mut discount = percent_code(1, "OLD", 1000);
        discount.start_date = now() - Duration::days(60);
        discount.end_date = now() - Duration::days(1);

        let outcome = evaluator().evaluate_manual("OLD", CodeLookup::Found(discount), &cart(500_000));
        assert_eq!(outcome.rejection(), Some(&RejectionReason::Expired));
        assert_eq!(outcome.amount(), Money::zero());
    }

    #[test]
    fn test_manual_not_found_and_unavailable() {
        let outcome = evaluator().evaluate_manual("NOPE", CodeLookup::NotFound, &cart(100));
        assert_eq!(outcome.rejection(), Some(&RejectionReason::NotFound));

        let outcome = evaluator().evaluate_manual("SALE10", CodeLookup::Unavailable, &cart(100));
        let reason = outcome.rejection().unwrap();
        assert_eq!(reason, &RejectionReason::CatalogUnavailable);
        assert!(reason.is_transient());
    }

    #[test]
    fn test_manual_code_is_case_sensitive() {
        let outcome = evaluator().evaluate_manual(
            "sale10",
            CodeLookup::Found(percent_code(1, "SALE10", 1000)),
            &cart(500_000),
        );
        assert_eq!(outcome.rejection(), Some(&RejectionReason::NotFound));
    }

    #[test]
    fn test_manual_disjoint_products_rejected() {
        let mut discount = percent_code(1, "SHOES", 1000);
        discount.target = DiscountTarget::Products(
            ["x1".to_string(), "x2".to_string()].into_iter().collect::<BTreeSet<_>>(),
        );
        let cart = cart(300).with_product("p1", Money::from_minor(300));

        let outcome = evaluator().evaluate_manual("SHOES", CodeLookup::Found(discount), &cart);
        assert_eq!(outcome.rejection(), Some(&RejectionReason::NoApplicableItems));
    }

    #[test]
    fn test_automatic_stacking() {
        let candidates = vec![
            automatic(fixed_code(1, "FLAT", 20_000), None),
            automatic(percent_code(2, "FIVE", 500), None),
        ];
        let outcome = evaluator().evaluate_automatic(CandidateLookup::Loaded(candidates), &cart(200_000));

        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.total, Money::from_minor(30_000));
        assert!(outcome.skipped.is_empty());
        assert!(!outcome.catalog_unavailable);
    }

    #[test]
    fn test_automatic_total_is_not_floored() {
        let candidates = vec![
            automatic(fixed_code(1, "A", 80), None),
            automatic(fixed_code(2, "B", 80), None),
        ];
        let outcome = evaluator().evaluate_automatic(CandidateLookup::Loaded(candidates), &cart(100));
        assert_eq!(outcome.total, Money::from_minor(160));
    }

    #[test]
    fn test_automatic_total_saturates() {
        let candidates = vec![
            automatic(percent_code(1, "ALL", 10_000), None),
            automatic(percent_code(2, "ALL2", 10_000), None),
        ];
        let outcome =
            evaluator().evaluate_automatic(CandidateLookup::Loaded(candidates), &cart(i64::MAX));

        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.total, Money::from_minor(i64::MAX));
    }

    #[test]
    fn test_automatic_ordering_by_priority_then_id() {
        let candidates = vec![
            automatic(fixed_code(5, "E", 10), None),
            automatic(fixed_code(4, "D", 10), Some(1)),
            automatic(fixed_code(3, "C", 10), Some(9)),
            automatic(fixed_code(2, "B", 10), None),
            automatic(fixed_code(1, "A", 10), Some(1)),
        ];
        let outcome = evaluator().evaluate_automatic(CandidateLookup::Loaded(candidates), &cart(1_000));
        let ids: Vec<i64> = outcome.applied.iter().map(|a| a.discount.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 2, 5]);
    }

    #[test]
    fn test_automatic_skips_ineligible_and_non_automatic() {
        let mut inactive = automatic(fixed_code(1, "A", 10), None);
        inactive.status = DiscountStatus::Inactive;
        let code_only = fixed_code(2, "B", 10);
        let ok = automatic(fixed_code(3, "C", 10), None);

        let outcome = evaluator()
            .evaluate_automatic(CandidateLookup::Loaded(vec![inactive, code_only, ok]), &cart(1_000));
        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.total, Money::from_minor(10));
        assert_eq!(
            outcome.skipped,
            vec![(1, RejectionReason::Inactive), (2, RejectionReason::NotFound)]
        );
    }

    #[test]
    fn test_automatic_unavailable_is_empty() {
        let outcome = evaluator().evaluate_automatic(CandidateLookup::Unavailable, &cart(1_000));
        assert!(outcome.is_empty());
        assert_eq!(outcome.total, Money::zero());
        assert!(outcome.catalog_unavailable);
    }

    #[test]
    fn test_automatic_beats_smaller_manual() {
        let candidates = vec![
            automatic(fixed_code(1, "FLAT", 20_000), None),
            automatic(percent_code(2, "FIVE", 500), None),
        ];
        let evaluation = evaluator().evaluate(
            Some(("TAKE15", CodeLookup::Found(fixed_code(9, "TAKE15", 15_000)))),
            CandidateLookup::Loaded(candidates),
            &cart(200_000),
        );

        assert!(evaluation.manual.as_ref().unwrap().is_accepted());
        assert_eq!(
            evaluation.resolution,
            Resolution::Applied {
                source: DiscountSource::Automatic,
                amount: Money::from_minor(30_000)
            }
        );
    }

    #[test]
    fn test_manual_beats_smaller_automatic() {
        let evaluation = evaluator().evaluate(
            Some(("TAKE50", CodeLookup::Found(fixed_code(9, "TAKE50", 50_000)))),
            CandidateLookup::Loaded(vec![automatic(fixed_code(1, "FLAT", 20_000), None)]),
            &cart(200_000),
        );
        assert_eq!(
            evaluation.resolution,
            Resolution::Applied {
                source: DiscountSource::Manual,
                amount: Money::from_minor(50_000)
            }
        );
    }

    #[test]
    fn test_tie_goes_to_automatic() {
        let evaluation = evaluator().evaluate(
            Some(("SAME", CodeLookup::Found(fixed_code(9, "SAME", 20_000)))),
            CandidateLookup::Loaded(vec![automatic(fixed_code(1, "FLAT", 20_000), None)]),
            &cart(200_000),
        );
        assert_eq!(evaluation.resolution.source(), Some(DiscountSource::Automatic));
        assert_eq!(evaluation.resolution.amount(), Money::from_minor(20_000));
    }

    #[test]
    fn test_rejected_manual_falls_back_to_automatic() {
        let evaluation = evaluator().evaluate(
            Some(("NOPE", CodeLookup::NotFound)),
            CandidateLookup::Loaded(vec![automatic(fixed_code(1, "FLAT", 5_000), None)]),
            &cart(200_000),
        );
        assert!(!evaluation.manual.as_ref().unwrap().is_accepted());
        assert_eq!(evaluation.resolution.source(), Some(DiscountSource::Automatic));
    }

    #[test]
    fn test_nothing_applies() {
        let evaluation = evaluator().evaluate(
            Some(("NOPE", CodeLookup::NotFound)),
            CandidateLookup::Loaded(vec![]),
            &cart(200_000),
        );
        assert_eq!(evaluation.resolution, Resolution::None);
        assert_eq!(evaluation.resolution.amount(), Money::zero());
    }

    #[test]
    fn test_manual_alone_when_automatic_unavailable() {
        let evaluation = evaluator().evaluate(
            Some(("SALE10", CodeLookup::Found(percent_code(1, "SALE10", 1000)))),
            CandidateLookup::Unavailable,
            &cart(500_000),
        );
        assert!(evaluation.automatic.catalog_unavailable);
        assert_eq!(
            evaluation.resolution,
            Resolution::Applied {
                source: DiscountSource::Manual,
                amount: Money::from_minor(50_000)
            }
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let candidates = vec![
            automatic(fixed_code(1, "FLAT", 20_000), Some(2)),
            automatic(percent_code(2, "FIVE", 500), Some(2)),
        ];
        let cart = cart(200_000).with_customer("c1");
        let run = || {
            evaluator().evaluate(
                Some(("SALE10", CodeLookup::Found(percent_code(9, "SALE10", 1000)))),
                CandidateLookup::Loaded(candidates.clone()),
                &cart,
            )
        };
        assert_eq!(run(), run());
    }
}
