//! # Discount Repository
//!
//! Read access to the discount catalog, plus the insert path used by the
//! seed binary and tests.
//!
//! ## Row Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  discounts row                        vela_core::Discount               │
//! │  ─────────────                        ───────────────────               │
//! │  type = 'percentage', value = 1000 ─► effect: Percentage { 10%, cap }  │
//! │  max_discount_amount ───────────────┘                                   │
//! │  type = 'fixed', value = 20000 ────► effect: Fixed { 20,000 }          │
//! │                                                                         │
//! │  target_type = 'products'  ────────► target: Products({"p1","p2"})     │
//! │  target_values = '["p1","p2"]' ────┘                                    │
//! │                                                                         │
//! │  DiscountRecord (FromRow) ──TryFrom──► Discount  (or InvalidRecord)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No business rule lives here. The repository answers "what is stored";
//! whether a discount applies is decided by `vela_core::evaluator`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use vela_core::validation::validate_discount;
use vela_core::{
    Discount, DiscountEffect, DiscountKind, DiscountStatus, DiscountTarget, Money, PercentRate,
    TargetType,
};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id,
        code,
        name,
        type,
        value,
        max_discount_amount,
        target_type,
        target_values,
        min_order_amount,
        is_first_purchase_only,
        is_automatic,
        usage_limit,
        usage_count,
        status,
        priority,
        start_date,
        end_date
    FROM discounts
"#;

// =============================================================================
// Records
// =============================================================================

/// A `discounts` row exactly as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DiscountRecord {
    pub id: i64,
    pub code: Option<String>,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: DiscountKind,
    pub value: i64,
    pub max_discount_amount: Option<i64>,
    pub target_type: TargetType,
    pub target_values: Option<String>,
    pub min_order_amount: Option<i64>,
    pub is_first_purchase_only: bool,
    pub is_automatic: bool,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub status: DiscountStatus,
    pub priority: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl TryFrom<DiscountRecord> for Discount {
    type Error = DbError;

    fn try_from(record: DiscountRecord) -> Result<Self, Self::Error> {
        let id = record.id;

        let effect = match record.kind {
            DiscountKind::Percentage => {
                let bps = u32::try_from(record.value)
                    .map_err(|_| DbError::invalid_record(id, "percentage out of range"))?;
                DiscountEffect::Percentage {
                    rate: PercentRate::from_bps(bps),
                    cap: record.max_discount_amount.map(Money::from_minor),
                }
            }
            DiscountKind::Fixed => DiscountEffect::Fixed {
                amount: Money::from_minor(record.value),
            },
        };

        let target = match record.target_type {
            TargetType::All => DiscountTarget::All,
            TargetType::Products => DiscountTarget::Products(parse_values(id, &record.target_values)?),
            TargetType::Categories => {
                DiscountTarget::Categories(parse_values(id, &record.target_values)?)
            }
            TargetType::Customers => {
                DiscountTarget::Customers(parse_values(id, &record.target_values)?)
            }
        };

        let discount = Discount {
            id,
            code: record.code,
            name: record.name,
            start_date: record.start_date,
            end_date: record.end_date,
            effect,
            target,
            min_order_amount: record.min_order_amount.map(Money::from_minor),
            is_first_purchase_only: record.is_first_purchase_only,
            is_automatic: record.is_automatic,
            usage_limit: record.usage_limit,
            usage_count: record.usage_count,
            status: record.status,
            priority: record.priority,
        };

        validate_discount(&discount).map_err(|e| DbError::invalid_record(id, e.to_string()))?;

        Ok(discount)
    }
}

/// Parses a `target_values` JSON array.
fn parse_values(id: i64, raw: &Option<String>) -> DbResult<BTreeSet<String>> {
    let raw = raw
        .as_deref()
        .ok_or_else(|| DbError::invalid_record(id, "target_values missing"))?;

    serde_json::from_str::<Vec<String>>(raw)
        .map(|values| values.into_iter().collect())
        .map_err(|e| DbError::invalid_record(id, format!("target_values: {}", e)))
}

/// A discount definition to be stored.
///
/// Same shape as [`Discount`] without the database-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiscount {
    pub code: Option<String>,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub effect: DiscountEffect,
    pub target: DiscountTarget,
    pub min_order_amount: Option<Money>,
    pub is_first_purchase_only: bool,
    pub is_automatic: bool,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    pub status: DiscountStatus,
    pub priority: Option<i32>,
}

impl NewDiscount {
    /// Starts an active, code-entered discount on the whole order.
    pub fn new(
        name: impl Into<String>,
        effect: DiscountEffect,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        NewDiscount {
            code: None,
            name: name.into(),
            start_date,
            end_date,
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

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn target(mut self, target: DiscountTarget) -> Self {
        self.target = target;
        self
    }

    pub fn automatic(mut self, priority: Option<i32>) -> Self {
        self.is_automatic = true;
        self.priority = priority;
        self
    }

    pub fn min_order(mut self, amount: Money) -> Self {
        self.min_order_amount = Some(amount);
        self
    }

    pub fn first_purchase_only(mut self) -> Self {
        self.is_first_purchase_only = true;
        self
    }

    pub fn usage(mut self, limit: Option<i64>, count: i64) -> Self {
        self.usage_limit = limit;
        self.usage_count = count;
        self
    }

    pub fn status(mut self, status: DiscountStatus) -> Self {
        self.status = status;
        self
    }

    fn to_discount(&self, id: i64) -> Discount {
        Discount {
            id,
            code: self.code.clone(),
            name: self.name.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            effect: self.effect.clone(),
            target: self.target.clone(),
            min_order_amount: self.min_order_amount,
            is_first_purchase_only: self.is_first_purchase_only,
            is_automatic: self.is_automatic,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            status: self.status,
            priority: self.priority,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for discount catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.discounts();
///
/// let sale10 = repo.find_by_code("SALE10").await?;
/// let candidates = repo.list_automatic_candidates(Utc::now()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    /// Creates a new DiscountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Looks up a discount by its exact code.
    ///
    /// ## Matching
    /// Case-sensitive: SQLite's default `=` on TEXT compares bytes, so
    /// `sale10` does not find `SALE10`.
    ///
    /// ## Returns
    /// * `Ok(Some(Discount))` - Code exists
    /// * `Ok(None)` - No discount has this code
    /// * `Err(DbError::InvalidRecord)` - Row exists but is inconsistent
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Discount>> {
        debug!(code = %code, "Looking up discount code");

        let sql = format!("{} WHERE code = ?1", SELECT_COLUMNS);
        let record = sqlx::query_as::<_, DiscountRecord>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        record.map(Discount::try_from).transpose()
    }

    /// Lists automatic discounts that are active and within their window at `now`.
    ///
    /// Rows that fail translation are skipped with a warning so one bad row
    /// cannot hide every other automatic discount.
    pub async fn list_automatic_candidates(&self, now: DateTime<Utc>) -> DbResult<Vec<Discount>> {
        let sql = format!(
            "{} WHERE is_automatic = 1 AND status = 'active' ORDER BY id",
            SELECT_COLUMNS
        );
        let records = sqlx::query_as::<_, DiscountRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut candidates = Vec::with_capacity(records.len());
        for record in records {
            match Discount::try_from(record) {
                Ok(discount) if discount.is_within_window(now) => candidates.push(discount),
                Ok(discount) => {
                    debug!(discount_id = discount.id, "Automatic discount outside its window")
                }
                Err(e) => warn!(error = %e, "Skipping unreadable automatic discount"),
            }
        }

        debug!(count = candidates.len(), "Loaded automatic candidates");
        Ok(candidates)
    }

    /// Inserts a new discount after validating it.
    ///
    /// ## Returns
    /// * `Ok(id)` - Database-assigned id
    /// * `Err(DbError::Validation)` - Definition breaks a structural rule
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, discount: &NewDiscount) -> DbResult<i64> {
        validate_discount(&discount.to_discount(0))?;

        let (value, cap) = match &discount.effect {
            DiscountEffect::Percentage { rate, cap } => {
                (rate.bps() as i64, cap.map(|c| c.minor_units()))
            }
            DiscountEffect::Fixed { amount } => (amount.minor_units(), None),
        };

        let target_values = discount
            .target
            .values()
            .map(|values| {
                serde_json::to_string(values)
                    .map_err(|e| DbError::Internal(format!("target_values: {}", e)))
            })
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO discounts (
                code, name, type, value, max_discount_amount,
                target_type, target_values, min_order_amount,
                is_first_purchase_only, is_automatic,
                usage_limit, usage_count, status, priority,
                start_date, end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&discount.code)
        .bind(&discount.name)
        .bind(discount.effect.kind())
        .bind(value)
        .bind(cap)
        .bind(discount.target.target_type())
        .bind(target_values)
        .bind(discount.min_order_amount.map(|m| m.minor_units()))
        .bind(discount.is_first_purchase_only)
        .bind(discount.is_automatic)
        .bind(discount.usage_limit)
        .bind(discount.usage_count)
        .bind(discount.status)
        .bind(discount.priority)
        .bind(discount.start_date)
        .bind(discount.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: discount.code.clone().unwrap_or_default(),
            },
            other => other,
        })?;

        let id = result.last_insert_rowid();
        debug!(discount_id = id, name = %discount.name, "Inserted discount");
        Ok(id)
    }

    /// Counts all stored discounts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM discounts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Tests
// =============================================================================
