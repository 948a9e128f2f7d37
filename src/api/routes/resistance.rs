//! Resistance Training Routes
//!
//! - GET/POST /api/exercises - Shared exercise catalog
//! - GET/POST /api/sessions - Recent sessions (with sets) / start a session
//! - GET/DELETE /api/sessions/:id
//! - POST /api/sessions/:id/finish - Set the end time (defaults to now)
//! - POST /api/sessions/:id/sets - Append a set
//! - PUT/DELETE /api/sets/:id
//! - GET/POST /api/routines, DELETE /api/routines/:id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use fitlog_core::models::{
    Exercise, FinishSession, NewExercise, NewRoutine, NewSession, NewSet, Routine,
    WorkoutSession, WorkoutSet,
};

use crate::api::error::{ApiError, ApiResult};
use crate::api::session::AuthUser;
use crate::api::state::AppState;

/// Sessions returned by the list endpoint
pub const SESSION_LIST_LIMIT: usize = 20;

// ==================== Exercises ====================

pub async fn list_exercises(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<Exercise>>> {
    Ok(Json(state.db(|s| s.list_exercises()).await?))
}

pub async fn create_exercise(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Json(req): Json<NewExercise>,
) -> ApiResult<Json<Exercise>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Exercise name is required".into()));
    }
    Ok(Json(state.db(move |s| s.create_exercise(req)).await?))
}

// ==================== Sessions ====================

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<WorkoutSession>>> {
    let sessions = state
        .db(move |s| s.list_sessions(auth.user_id, SESSION_LIST_LIMIT))
        .await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<WorkoutSession>> {
    Ok(Json(state.db(move |s| s.get_session(auth.user_id, id)).await?))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewSession>,
) -> ApiResult<Json<WorkoutSession>> {
    let session = state.db(move |s| s.create_session(auth.user_id, req)).await?;
    tracing::info!(user_id = auth.user_id, session_id = session.id, "Started session");
    Ok(Json(session))
}

pub async fn finish_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    body: Option<Json<FinishSession>>,
) -> ApiResult<StatusCode> {
    let end_time = body
        .and_then(|Json(b)| b.end_time)
        .unwrap_or_else(Utc::now);
    state
        .db(move |s| s.finish_session(auth.user_id, id, end_time))
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_session(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}

// ==================== Sets ====================

pub async fn add_set(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(session_id): Path<i64>,
    Json(req): Json<NewSet>,
) -> ApiResult<Json<WorkoutSet>> {
    Ok(Json(
        state
            .db(move |s| s.add_set(auth.user_id, session_id, req))
            .await?,
    ))
}

pub async fn update_set(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<NewSet>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.update_set(auth.user_id, id, req)).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_set(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_set(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}

// ==================== Routines ====================

pub async fn list_routines(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Routine>>> {
    Ok(Json(state.db(move |s| s.list_routines(auth.user_id)).await?))
}

pub async fn create_routine(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewRoutine>,
) -> ApiResult<Json<Routine>> {
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Routine name is required".into()));
    }
    Ok(Json(
        state.db(move |s| s.create_routine(auth.user_id, req)).await?,
    ))
}

pub async fn delete_routine(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_routine(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}
