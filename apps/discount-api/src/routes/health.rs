//! Health check.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_handler))
}

/// Always `200`; a broken catalog degrades the service rather than failing it.
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let reachable = tokio::time::timeout(state.config.catalog_timeout, state.db.health_check())
        .await
        .unwrap_or(false);

    Json(if reachable {
        HealthResponse {
            status: "ok",
            database: "connected",
        }
    } else {
        HealthResponse {
            status: "degraded",
            database: "unavailable",
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::routes::testing;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_ok() {
        let app = testing::app(testing::database().await);
        let (status, body) = testing::get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_health_degraded_when_catalog_closed() {
        let db = testing::database().await;
        db.close().await;
        let (status, body) = testing::get(testing::app(db), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "unavailable");
    }
}
