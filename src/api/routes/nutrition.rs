//! Nutrition Routes
//!
//! - GET/POST /api/meals - Recent meals (with entries) / log a meal
//! - PUT/DELETE /api/meals/:id - Rename / delete (entries cascade)
//! - POST /api/meals/:id/entries - Add a food entry
//! - DELETE /api/meals/entries/:id
//! - GET/POST /api/nutrition/library - Shared per-100 g food library
//! - POST /api/nutrition/water - Log water intake

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use fitlog_core::models::{
    FoodEntry, FoodLibraryItem, Meal, NewFoodEntry, NewLibraryItem, NewMeal, RenameMeal, WaterLog,
};

use crate::api::error::ApiResult;
use crate::api::session::AuthUser;
use crate::api::state::AppState;

/// Meals returned by the list endpoint
pub const MEAL_LIST_LIMIT: usize = 20;

pub async fn list_meals(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Meal>>> {
    Ok(Json(
        state.db(move |s| s.list_meals(auth.user_id, MEAL_LIST_LIMIT)).await?,
    ))
}

pub async fn create_meal(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<NewMeal>,
) -> ApiResult<Json<Meal>> {
    Ok(Json(state.db(move |s| s.create_meal(auth.user_id, req)).await?))
}

pub async fn rename_meal(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<RenameMeal>,
) -> ApiResult<StatusCode> {
    state
        .db(move |s| s.rename_meal(auth.user_id, id, &req.name))
        .await?;
    Ok(StatusCode::OK)
}

pub async fn delete_meal(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_meal(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}

pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(meal_id): Path<i64>,
    Json(req): Json<NewFoodEntry>,
) -> ApiResult<Json<FoodEntry>> {
    Ok(Json(
        state
            .db(move |s| s.add_entry(auth.user_id, meal_id, req))
            .await?,
    ))
}

pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db(move |s| s.delete_entry(auth.user_id, id)).await?;
    Ok(StatusCode::OK)
}

pub async fn list_library(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<FoodLibraryItem>>> {
    Ok(Json(state.db(|s| s.list_library()).await?))
}

pub async fn create_library_item(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Json(req): Json<NewLibraryItem>,
) -> ApiResult<Json<FoodLibraryItem>> {
    Ok(Json(state.db(move |s| s.create_library_item(req)).await?))
}

pub async fn log_water(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<WaterLog>,
) -> ApiResult<StatusCode> {
    state
        .db(move |s| s.log_water(auth.user_id, req.amount_ml))
        .await?;
    Ok(StatusCode::OK)
}
