//! Health check endpoint, mounted at the root (not under `/api/v1`) so
//! load balancers can probe it without auth or versioning.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health
///
/// Reports service status and database reachability.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = palco_db::health_check(&state.pool).await.is_ok();
    let status = if db_healthy { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
