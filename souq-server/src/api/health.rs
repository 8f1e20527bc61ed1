//! Health check endpoints

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;

use crate::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Store health check failed: {e}");
            false
        }
    };
    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if store_ok { "ok" } else { "degraded" },
            "service": "souq-server",
            "version": env!("CARGO_PKG_VERSION"),
            "git_hash": option_env!("GIT_HASH").unwrap_or("dev"),
        })),
    )
}

/// GET /api/health
///
/// Reports whether the identity provider answers.
pub async fn provider_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.identity.health().await {
        Ok(body) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "auth": {
                    "name": body.get("name").cloned().unwrap_or_default(),
                    "version": body.get("version").cloned().unwrap_or_default(),
                },
            })),
        ),
        Err(e) => {
            tracing::warn!("Identity provider health check failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}
