//! # Discount Service
//!
//! The I/O half of evaluation: reads the catalog under a timeout, turns
//! every failure into the "unavailable" lookup, and hands the results to
//! the pure evaluator in `vela-core`.
//!
//! ```text
//!  request ──► now = Utc::now()
//!                 │
//!        ┌────────┴─────────┐           (concurrent)
//!        ▼                  ▼
//!  find_by_code      list_automatic_candidates
//!  └ timeout ┘       └ timeout ┘
//!        │                  │
//!   CodeLookup        CandidateLookup
//!        └────────┬─────────┘
//!                 ▼
//!     DiscountEvaluator::at(now).evaluate(..)
//! ```

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use vela_core::validation::validate_code;
use vela_core::{
    AutomaticOutcome, CandidateLookup, CartContext, CodeLookup, DiscountEvaluator, Evaluation,
    ValidationError,
};
use vela_db::{Database, DbResult};

/// Evaluates carts against the live catalog.
#[derive(Debug, Clone)]
pub struct DiscountService {
    db: Database,
    catalog_timeout: Duration,
}

impl DiscountService {
    pub fn new(db: Database, catalog_timeout: Duration) -> Self {
        DiscountService {
            db,
            catalog_timeout,
        }
    }

    /// Validates a submitted code and compares it with the automatic set.
    ///
    /// ## Errors
    /// Only a blank code is an error. A code with characters no stored code
    /// can contain is answered as not found without touching the catalog.
    pub async fn validate(
        &self,
        code: &str,
        cart: &CartContext,
    ) -> Result<Evaluation, ValidationError> {
        self.validate_at(code, cart, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        code: &str,
        cart: &CartContext,
        now: DateTime<Utc>,
    ) -> Result<Evaluation, ValidationError> {
        let (lookup, candidates) = match validate_code(code) {
            Ok(()) => tokio::join!(self.lookup_code(code), self.load_candidates(now)),
            Err(err @ ValidationError::Required { .. }) => return Err(err),
            Err(err) => {
                debug!(code = %code, error = %err, "Code cannot exist in catalog");
                (CodeLookup::NotFound, self.load_candidates(now).await)
            }
        };

        let evaluation = DiscountEvaluator::at(now).evaluate(Some((code, lookup)), candidates, cart);
        log_skipped(&evaluation.automatic);

        match evaluation.manual.as_ref().and_then(|m| m.rejection()) {
            Some(reason) if reason.is_transient() => {
                warn!(code = %code, "Discount code could not be checked")
            }
            Some(reason) => info!(code = %code, reason = reason.code(), "Discount code rejected"),
            None => {}
        }
        info!(
            code = %code,
            manual = %evaluation.manual.as_ref().map(|m| m.amount()).unwrap_or_default(),
            automatic = %evaluation.automatic.total,
            better = ?evaluation.resolution.source(),
            "Discount code evaluated"
        );

        Ok(evaluation)
    }

    /// Evaluates the automatic discounts for a cart.
    pub async fn automatic(&self, cart: &CartContext) -> AutomaticOutcome {
        self.automatic_at(cart, Utc::now()).await
    }

    pub async fn automatic_at(&self, cart: &CartContext, now: DateTime<Utc>) -> AutomaticOutcome {
        let candidates = self.load_candidates(now).await;
        let outcome = DiscountEvaluator::at(now).evaluate_automatic(candidates, cart);
        log_skipped(&outcome);

        info!(
            applied = outcome.applied.len(),
            total = %outcome.total,
            "Automatic discounts evaluated"
        );
        outcome
    }

    async fn lookup_code(&self, code: &str) -> CodeLookup {
        match self
            .bounded("find_by_code", self.db.discounts().find_by_code(code))
            .await
        {
            Some(Some(discount)) => CodeLookup::Found(discount),
            Some(None) => CodeLookup::NotFound,
            None => CodeLookup::Unavailable,
        }
    }

    async fn load_candidates(&self, now: DateTime<Utc>) -> CandidateLookup {
        match self
            .bounded(
                "list_automatic_candidates",
                self.db.discounts().list_automatic_candidates(now),
            )
            .await
        {
            Some(candidates) => CandidateLookup::Loaded(candidates),
            None => CandidateLookup::Unavailable,
        }
    }

    /// Runs a catalog read under the configured timeout.
    ///
    /// `None` means the catalog is unavailable, whether it failed or was slow.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        read: impl Future<Output = DbResult<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.catalog_timeout, read).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Catalog read failed");
                None
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.catalog_timeout.as_millis() as u64,
                    "Catalog read timed out"
                );
                None
            }
        }
    }
}

fn log_skipped(outcome: &AutomaticOutcome) {
    if outcome.catalog_unavailable {
        warn!("Automatic discounts unavailable, continuing without them");
    }
    for (discount_id, reason) in &outcome.skipped {
        debug!(discount_id, reason = reason.code(), "Automatic discount not eligible");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use vela_core::{DiscountEffect, DiscountSource, Money, RejectionReason};
    use vela_db::{DbConfig, NewDiscount};

    async fn service(timeout: Duration) -> DiscountService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        DiscountService::new(db, timeout)
    }

    fn flat(amount: i64) -> NewDiscount {
        let now = Utc::now();
        NewDiscount::new(
            "Flat",
            DiscountEffect::Fixed {
                amount: Money::from_minor(amount),
            },
            now - ChronoDuration::days(1),
            now + ChronoDuration::days(1),
        )
    }

    #[tokio::test]
    async fn test_blank_code_is_validation_error() {
        let service = service(Duration::from_secs(1)).await;
        let cart = CartContext::new(Money::from_minor(100));
        assert!(matches!(
            service.validate("  ", &cart).await,
            Err(ValidationError::Required { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_code_is_not_found() {
        let service = service(Duration::from_secs(1)).await;
        let cart = CartContext::new(Money::from_minor(100));
        let evaluation = service.validate("50% OFF", &cart).await.unwrap();
        assert_eq!(
            evaluation.manual.unwrap().rejection(),
            Some(&RejectionReason::NotFound)
        );
    }

    #[tokio::test]
    async fn test_validate_reads_catalog() {
        let service = service(Duration::from_secs(1)).await;
        service
            .db
            .discounts()
            .insert(&flat(15_000).code("TAKE15"))
            .await
            .unwrap();
        service
            .db
            .discounts()
            .insert(&flat(30_000).automatic(None))
            .await
            .unwrap();

        let cart = CartContext::new(Money::from_minor(200_000));
        let evaluation = service.validate("TAKE15", &cart).await.unwrap();
        assert!(evaluation.manual.as_ref().unwrap().is_accepted());
        assert_eq!(evaluation.resolution.source(), Some(DiscountSource::Automatic));
        assert_eq!(evaluation.resolution.amount(), Money::from_minor(30_000));
    }

    #[tokio::test]
    async fn test_closed_catalog_is_unavailable() {
        let service = service(Duration::from_secs(1)).await;
        service.db.close().await;

        let cart = CartContext::new(Money::from_minor(100));
        let evaluation = service.validate("SALE10", &cart).await.unwrap();
        assert_eq!(
            evaluation.manual.unwrap().rejection(),
            Some(&RejectionReason::CatalogUnavailable)
        );
        assert!(evaluation.automatic.catalog_unavailable);

        let outcome = service.automatic(&cart).await;
        assert!(outcome.catalog_unavailable);
        assert!(outcome.applied.is_empty());
    }

    #[tokio::test]
    async fn test_slow_read_times_out() {
        let service = service(Duration::from_millis(10)).await;
        let slow = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, vela_db::DbError>(1)
        };
        assert_eq!(service.bounded("slow", slow).await, None);

        let fast = async { Ok::<_, vela_db::DbError>(2) };
        assert_eq!(service.bounded("fast", fast).await, Some(2));
    }
}
