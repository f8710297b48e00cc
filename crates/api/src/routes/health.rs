//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreHealth,
    pub auth_configured: bool,
}

/// Ticket store health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreHealth {
    pub configured: bool,
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

async fn check_store(state: &AppState) -> StoreHealth {
    let Some(store) = state.store.as_deref() else {
        return StoreHealth {
            configured: false,
            connected: false,
            latency_ms: None,
        };
    };

    let start = std::time::Instant::now();
    let connected = match store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Ticket store ping failed");
            false
        }
    };

    StoreHealth {
        configured: true,
        connected,
        latency_ms: connected.then(|| start.elapsed().as_millis() as u64),
    }
}

/// Full health check endpoint.
///
/// Reports `healthy`, `degraded` (store or auth not configured) or
/// `unhealthy` (store unreachable). Only `unhealthy` is a 503.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = check_store(&state).await;
    let auth_configured = state.session.is_some();

    let (status_code, status) = if store.configured && !store.connected {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else if !store.configured || !auth_configured {
        (StatusCode::OK, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            store,
            auth_configured,
        }),
    )
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Ready only when a ticket store is configured and reachable.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let store = check_store(&state).await;
    if store.configured && store.connected {
        (
            StatusCode::OK,
            Json(StatusResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                status: "not_ready".to_string(),
            }),
        )
    }
}
