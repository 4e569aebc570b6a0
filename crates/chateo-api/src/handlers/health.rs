//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/health/detailed
pub async fn health_detailed(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let store_ok = match state.profiles.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            false
        }
    };

    Json(DetailedHealthResponse {
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store_ok { "connected" } else { "unavailable" }.to_string(),
        ws_connections: state.realtime.registry.connection_count(),
        connected_users: state.realtime.registry.identity_count(),
        online_users: state.realtime.presence.online_count(),
        metrics: state.realtime.metrics.snapshot(),
    })
}
