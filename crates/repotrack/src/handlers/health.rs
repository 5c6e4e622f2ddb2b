//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/health/liveness` - the process is up (immediate 200, no checks)
//! - `/health/readiness` - store reachable and no breaker open
//!
//! The cache is probed and reported but never makes the service unready,
//! since every pipeline works without it.

use std::fmt::Display;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use repotrack_core::breaker::CircuitState;
use repotrack_core::storage::StoreError;

use crate::resilience::BreakerSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Probe {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Probe {
    fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(err: impl Display) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub store: Probe,
    pub cache: Probe,
    pub breakers: Vec<BreakerSnapshot>,
}

/// GET /health/liveness - Basic liveness probe.
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "live" }))
}

/// GET /health/readiness - Readiness probe.
///
/// Returns 200 when the store answers a ping and no breaker is open,
/// 503 otherwise. The body always carries every probe result.
pub async fn readiness(State(state): State<AppState>) -> Response {
    let store = match tokio::time::timeout(state.store_timeout, state.store_health.ping()).await {
        Ok(Ok(())) => Probe::ok(),
        Ok(Err(err)) => Probe::failed(err),
        Err(_) => Probe::failed(StoreError::Timeout(state.store_timeout.as_millis() as u64)),
    };

    let cache = match state.cache.ping().await {
        Ok(()) => Probe::ok(),
        Err(err) => Probe::failed(err),
    };

    let breakers: Vec<BreakerSnapshot> = state.breakers.iter().map(|b| b.snapshot()).collect();
    let ready = store.ok && breakers.iter().all(|b| b.state != CircuitState::Open);

    let (status, label) = if ready {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!(store_ok = store.ok, cache_ok = cache.ok, "Service not ready");
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status,
        Json(Readiness {
            status: label,
            store,
            cache,
            breakers,
        }),
    )
        .into_response()
}
