//! Health Routes
//!
//! - GET /api/health - Liveness plus a database probe (no session required)

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /api/health
///
/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.db(|store| store.stats()).await;

    let (status, database, stats) = match stats {
        Ok(stats) => (StatusCode::OK, "ok", Some(stats)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, "error", None)
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "healthy" } else { "unhealthy" }.to_string(),
        database: database.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        stats,
    };

    (status, Json(body))
}
