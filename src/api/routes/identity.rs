//! Identity Routes
//!
//! - GET /api/user - The signed-in user
//! - POST /api/user - Create a user profile
//! - PUT /api/user - Partially update the signed-in user

use axum::{extract::State, Json};
use std::sync::Arc;

use fitlog_core::models::{User, UserPayload};

use crate::api::error::ApiResult;
use crate::api::session::AuthUser;
use crate::api::state::AppState;

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<User>> {
    let user = state.db(move |s| s.get_user(auth.user_id)).await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Json(payload): Json<UserPayload>,
) -> ApiResult<Json<User>> {
    let user = state.db(move |s| s.create_user(payload)).await?;
    tracing::info!(user_id = user.id, "Created user");
    Ok(Json(user))
}

/// Name is replaced only when non-empty; other fields only when present
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(payload): Json<UserPayload>,
) -> ApiResult<Json<User>> {
    let user = state.db(move |s| s.update_user(auth.user_id, payload)).await?;
    Ok(Json(user))
}
