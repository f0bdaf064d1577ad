//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use autocatalog_core::traits::StoreProvider;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
///
/// 200 when the store answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, store) = match state.store.health_check().await {
        Ok(true) => (StatusCode::OK, "connected"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
        provider: state.store.kind().to_string(),
    };
    (status, Json(body))
}
