//! Running Routes
//!
//! - GET/POST /api/runs - Recent runs (with shoe label) / record a run
//! - GET/DELETE /api/runs/:id
//! - GET/POST /api/shoes - Shoe registry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use fitlog_core::models::{NewRun, NewShoe, Run, Shoe};
use fitlog_core::tracking::parse_route;

use crate::api::error::{ApiError, ApiResult};
use crate::api::session::AuthUser;
use crate::api::state::AppState;

/// Runs returned by the list endpoint
pub const RUN_LIST_LIMIT: usize = 100;

pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Run>>> {
    Ok(Json(
        state.db(move |s| s.list_runs(auth.user_id, RUN_LIST_LIMIT)).await?,
    ))
}

pub async fn get_run(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Run>> {
    Ok(Json(state.db(move |s| s.get_run(auth.user_id, id)).await?))
}

/// Route data, when present, must be a JSON array of `[lat, lon, alt, secs]`
pub async fn create_run(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewRun>,
) -> ApiResult<Json<Run>> {
    if let Some(route) = req.route_data.as_deref() {
        parse_route(route).map_err(|e| ApiError::Validation(e.to_string()))?;
    }
    Ok(Json(state.db(move |s| s.create_run(auth.user_id, req)).await?))
}

pub async fn delete_run(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_run(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}

pub async fn list_shoes(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Shoe>>> {
    Ok(Json(state.db(move |s| s.list_shoes(auth.user_id)).await?))
}

pub async fn create_shoe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewShoe>,
) -> ApiResult<Json<Shoe>> {
    if req.brand.trim().is_empty() || req.model.trim().is_empty() {
        return Err(ApiError::Validation("Brand and model are required".into()));
    }
    Ok(Json(state.db(move |s| s.create_shoe(auth.user_id, req)).await?))
}
