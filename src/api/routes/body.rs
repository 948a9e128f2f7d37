//! Body Metric Routes
//!
//! - GET /api/body/metrics - Most recent readings
//! - POST /api/body/metrics - Record weight and/or body fat

use axum::{extract::State, Json};
use std::sync::Arc;

use fitlog_core::models::{BodyMetric, NewBodyMetric};

use crate::api::error::ApiResult;
use crate::api::session::AuthUser;
use crate::api::state::AppState;

/// Readings returned by the list endpoint
pub const BODY_LIST_LIMIT: usize = 50;

pub async fn list_body_metrics(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<BodyMetric>>> {
    Ok(Json(
        state
            .db(move |s| s.list_body_metrics(auth.user_id, BODY_LIST_LIMIT))
            .await?,
    ))
}

pub async fn create_body_metric(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewBodyMetric>,
) -> ApiResult<Json<BodyMetric>> {
    Ok(Json(
        state
            .db(move |s| s.create_body_metric(auth.user_id, req))
            .await?,
    ))
}
