//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::metrics::BackendMetrics;
use crate::redis::CircuitBreakerStats;
use crate::server::AppState;
use crate::store::CacheInfo;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: StoreHealthResponse,
    pub cache: CacheInfo,
}

#[derive(Debug, Serialize)]
pub struct StoreHealthResponse {
    pub backend: String,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circuit_breaker: Option<CircuitBreakerStats>,
}

/// GET /health - Service and store health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.repository.backend();
    let check = backend.health_check().await;

    let circuit_breaker = backend.circuit_breaker().map(|cb| cb.stats());
    if let Some(stats) = &circuit_breaker {
        BackendMetrics::set_circuit_state(backend.backend_type(), stats.state);
    }

    let connected = check.is_ok();
    if let Err(e) = &check {
        tracing::warn!(backend = backend.backend_type(), error = %e, "Store health check failed");
    }

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        store: StoreHealthResponse {
            backend: backend.backend_type().to_string(),
            connected,
            error: check.err().map(|e| e.to_string()),
            circuit_breaker,
        },
        cache: state.repository.cache_info().await,
    })
}
