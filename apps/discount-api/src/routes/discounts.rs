//! # Discount Routes
//!
//! `POST /discounts/validate` and `POST /discounts/automatic`.
//!
//! Both always answer `200` for a well-formed request. Rejections and
//! catalog outages are reported in the body so checkout can continue.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use vela_core::validation::validate_amount;
use vela_core::{
    AppliedDiscount, CartContext, DiscountEffect, DiscountKind, DiscountSource, Evaluation,
    ManualOutcome, Money, Resolution, TargetType, ValidationError,
};

use crate::error::ApiResult;
use crate::AppState;

const AUTOMATIC_UNAVAILABLE: &str = "Could not load automatic discounts, please try again";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/discounts/validate", post(validate_handler))
        .route("/discounts/automatic", post(automatic_handler))
}

// =============================================================================
// Requests
// =============================================================================

/// Cart facts shared by both endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub product_prices: Option<HashMap<String, Money>>,
    #[serde(default)]
    pub product_categories: Option<HashMap<String, String>>,
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub is_first_purchase: bool,
    pub order_amount: Money,
}

impl CartPayload {
    /// Checks amounts and builds the evaluator's cart.
    pub fn into_cart(self) -> Result<CartContext, ValidationError> {
        validate_amount("orderAmount", self.order_amount)?;
        if let Some(prices) = &self.product_prices {
            for price in prices.values() {
                validate_amount("productPrices", *price)?;
            }
        }

        Ok(CartContext {
            product_ids: self.product_ids,
            product_prices: self.product_prices,
            product_categories: self.product_categories,
            category_names: self.category_names,
            customer_id: self.customer_id,
            is_first_purchase: self.is_first_purchase,
            order_amount: self.order_amount,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub code: String,
    #[serde(flatten)]
    pub cart: CartPayload,
}

// =============================================================================
// Responses
// =============================================================================

/// An applied discount as the storefront sees it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscountView {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    /// Basis points for percentage discounts, minor units for fixed ones.
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<Money>,
    pub target_type: TargetType,
    pub discount_amount: Money,
    pub applicable_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_to_products: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl From<&AppliedDiscount> for DiscountView {
    fn from(applied: &AppliedDiscount) -> Self {
        let discount = &applied.discount;
        let (value, max_discount_amount) = match &discount.effect {
            DiscountEffect::Percentage { rate, cap } => (rate.bps() as i64, *cap),
            DiscountEffect::Fixed { amount } => (amount.minor_units(), None),
        };

        DiscountView {
            id: discount.id,
            code: discount.code.clone(),
            name: discount.name.clone(),
            kind: discount.effect.kind(),
            value,
            max_discount_amount,
            target_type: discount.target.target_type(),
            discount_amount: applied.amount,
            applicable_amount: applied.applicable_base,
            applied_to_products: applied.applied_to_products.clone(),
            priority: discount.priority,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<DiscountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_discounts: Option<Vec<DiscountView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_discount_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_discount_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub better_discount_type: Option<DiscountSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_to_products: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_amount: Option<Money>,
}

impl From<&Evaluation> for ValidateResponse {
    fn from(evaluation: &Evaluation) -> Self {
        let mut response = ValidateResponse::default();

        match &evaluation.manual {
            Some(ManualOutcome::Accepted(applied)) => {
                response.valid = true;
                response.discount = Some(DiscountView::from(applied));
                response.discount_amount = Some(applied.amount);
                response.applicable_amount = Some(applied.applicable_base);
                response.applied_to_products = applied.applied_to_products.clone();
            }
            Some(ManualOutcome::Rejected { reason, .. }) => {
                response.error_code = Some(reason.code());
                response.error_message = Some(reason.to_string());
            }
            None => {}
        }

        let automatic = &evaluation.automatic;
        if !automatic.is_empty() {
            response.automatic_discounts =
                Some(automatic.applied.iter().map(DiscountView::from).collect());
            response.automatic_discount_amount = Some(automatic.total);
        }

        if let Resolution::Applied { source, amount } = evaluation.resolution {
            response.better_discount_type = Some(source);
            response.total_discount_amount = Some(amount);
        }

        response
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticResponse {
    pub success: bool,
    pub discounts: Vec<DiscountView>,
    pub total_discount_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn validate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<Json<ValidateResponse>> {
    let Json(request) = payload?;
    let cart = request.cart.into_cart()?;

    let evaluation = state.discounts.validate(&request.code, &cart).await?;
    Ok(Json(ValidateResponse::from(&evaluation)))
}

async fn automatic_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CartPayload>, JsonRejection>,
) -> ApiResult<Json<AutomaticResponse>> {
    let Json(request) = payload?;
    let cart = request.into_cart()?;

    let outcome = state.discounts.automatic(&cart).await;
    let response = if outcome.catalog_unavailable {
        AutomaticResponse {
            success: false,
            discounts: Vec::new(),
            total_discount_amount: Money::zero(),
            error_message: Some(AUTOMATIC_UNAVAILABLE.to_string()),
        }
    } else {
        AutomaticResponse {
            success: true,
            discounts: outcome.applied.iter().map(DiscountView::from).collect(),
            total_discount_amount: outcome.total,
            error_message: None,
        }
    };

    Ok(Json(response))
}

// =============================================================================
// Tests
// =============================================================================
