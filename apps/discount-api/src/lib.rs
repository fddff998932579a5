//! # Vela Discount API
//!
//! HTTP server that answers "which discount does this cart get?" for the
//! storefront.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Discount API Routes                              │
//! │                                                                         │
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐            │
//! │  │ POST /discounts/validate │  │ POST /discounts/automatic│            │
//! │  │                          │  │                          │            │
//! │  │ • code lookup            │  │ • automatic candidates   │            │
//! │  │ • automatic candidates   │  │ • stacked total          │            │
//! │  │ • better of the two      │  │                          │            │
//! │  └──────────────────────────┘  └──────────────────────────┘            │
//! │                                                                         │
//! │  ┌──────────────────────────┐                                          │
//! │  │ GET /health              │                                          │
//! │  │ • catalog reachability   │                                          │
//! │  └──────────────────────────┘                                          │
//! │                                                                         │
//! │  DiscountService ──► vela-db (timeout) ──► vela-core evaluator         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `VELA_HTTP_PORT` - HTTP port (default: 8080)
//! - `VELA_BIND_ADDR` - Bind interface (default: 0.0.0.0)
//! - `VELA_DB_PATH` - SQLite catalog path (default: ./vela.db)
//! - `VELA_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `VELA_CATALOG_TIMEOUT_MS` - Per-read catalog timeout (default: 2000)

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod service;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use service::DiscountService;

use vela_db::Database;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub discounts: DiscountService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            discounts: DiscountService::new(db.clone(), config.catalog_timeout),
            db,
            config,
        }
    }
}

/// Builds the application router with tracing and state attached.
///
/// Used by the server and by in-process tests.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::discounts::router())
        .merge(routes::health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
