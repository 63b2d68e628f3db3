//! Health check endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// Health check handler
///
/// Reports 503 when the store does not answer a trivial query.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    metrics::counter!("devnet_health_checks_total").increment(1);

    let database_ok = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: database unavailable: {}", e);
            false
        }
    };

    let (status, label) = if database_ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database: if database_ok { "ok" } else { "unavailable" },
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
