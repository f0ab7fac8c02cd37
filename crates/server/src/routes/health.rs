use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use locstat::Workspace;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "locstat-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Ready once a workspace can be created and removed under the configured
/// parent directory.
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let pipeline = state.pipeline.clone();
    let workspace_ok = tokio::task::spawn_blocking(move || {
        Workspace::create(&pipeline.extract).map(Workspace::close)
    })
    .await?;

    if let Err(err) = workspace_ok {
        return Err(ServerError::Internal(format!(
            "workspace directory unavailable: {err}"
        )));
    }

    Ok(Json(json!({
        "status": "ready",
        "service": "locstat-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
        "components": {
            "api": "ready",
            "workspace": "ready",
        }
    })))
}

/// Pipeline counters as JSON
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    if !state.config.metrics_enabled {
        return Err(ServerError::NotFound);
    }

    Ok(Json(json!({
        "uptime_seconds": uptime_seconds(),
        "pipeline": state.metrics.snapshot(),
    })))
}
