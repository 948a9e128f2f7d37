//! HTTP API Client
//!
//! Functions for communicating with the fitlog REST API. Every request
//! carries the session cookie.

use chrono::{DateTime, NaiveDate, Utc};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::RequestCredentials;

use fitlog_core::models::{
    AuthResponse, BodyMetric, DailySummary, Exercise, FinishSession, FoodEntry, FoodLibraryItem,
    Meal, NewBodyMetric, NewExercise, NewFoodEntry, NewLibraryItem, NewMeal, NewRoutine, NewRun,
    NewSession, NewSet, NewShoe, PhoneLogin, RenameMeal, Routine, Run, Shoe, User, UserPayload,
    WaterLog, WorkoutSession, WorkoutSet,
};

/// Default API base URL (same origin)
pub const DEFAULT_API_BASE: &str = "/api";

const API_BASE_KEY: &str = "fitlog_api_url";

/// Get the API base URL from local storage or use default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(API_BASE_KEY).ok().flatten())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    url.trim_end_matches('/').to_string()
}

/// Set the API base URL in local storage
pub fn set_api_base(url: &str) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.set_item(API_BASE_KEY, url);
    }
}

/// Browser URL that starts Google sign-in
pub fn google_login_url() -> String {
    format!("{}/auth/google/login", get_api_base())
}

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

fn with_cookie(builder: RequestBuilder) -> RequestBuilder {
    builder.credentials(RequestCredentials::Include)
}

/// Message for a failed response: the body text, or `Error {status}` when blank
pub fn error_message(status: u16, text: &str) -> String {
    if text.trim().is_empty() {
        format!("Error {}", status)
    } else {
        text.to_string()
    }
}

/// Decode a successful body, falling back to the default when empty or malformed
pub fn decode_body<T: DeserializeOwned + Default>(text: &str) -> T {
    if text.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            log_warning(&format!("Malformed response body, using default: {}", e));
            T::default()
        }
    }
}

fn log_warning(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

async fn read(response: Response) -> Result<String, String> {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if !response.ok() {
        return Err(error_message(status, &text));
    }
    Ok(text)
}

async fn send<T: DeserializeOwned + Default>(
    request: Result<Request, gloo_net::Error>,
) -> Result<T, String> {
    let request = request.map_err(|e| format!("Request build error: {}", e))?;
    let response = request
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    Ok(decode_body(&read(response).await?))
}

async fn get<T: DeserializeOwned + Default>(path: &str) -> Result<T, String> {
    send(with_cookie(Request::get(&url(path))).build()).await
}

async fn post<B: Serialize, T: DeserializeOwned + Default>(path: &str, body: &B) -> Result<T, String> {
    send(with_cookie(Request::post(&url(path))).json(body)).await
}

async fn put<B: Serialize>(path: &str, body: &B) -> Result<(), String> {
    send::<serde_json::Value>(with_cookie(Request::put(&url(path))).json(body))
        .await
        .map(|_| ())
}

async fn delete(path: &str) -> Result<(), String> {
    send::<serde_json::Value>(with_cookie(Request::delete(&url(path))).build())
        .await
        .map(|_| ())
}

// ============ Identity ============

pub async fn get_user() -> Result<User, String> {
    get("/user").await
}

pub async fn create_user(payload: &UserPayload) -> Result<User, String> {
    post("/user", payload).await
}

pub async fn update_user(payload: &UserPayload) -> Result<User, String> {
    send(with_cookie(Request::put(&url("/user"))).json(payload)).await
}

// ============ Resistance ============

pub async fn list_exercises() -> Result<Vec<Exercise>, String> {
    get("/exercises").await
}

pub async fn create_exercise(exercise: &NewExercise) -> Result<Exercise, String> {
    post("/exercises", exercise).await
}

pub async fn list_sessions() -> Result<Vec<WorkoutSession>, String> {
    get("/sessions").await
}

pub async fn get_session(id: i64) -> Result<WorkoutSession, String> {
    get(&format!("/sessions/{}", id)).await
}

pub async fn create_session(session: &NewSession) -> Result<WorkoutSession, String> {
    post("/sessions", session).await
}

pub async fn finish_session(id: i64, end_time: DateTime<Utc>) -> Result<(), String> {
    post::<_, serde_json::Value>(
        &format!("/sessions/{}/finish", id),
        &FinishSession {
            end_time: Some(end_time),
        },
    )
    .await
    .map(|_| ())
}

pub async fn delete_session(id: i64) -> Result<(), String> {
    delete(&format!("/sessions/{}", id)).await
}

pub async fn add_set(session_id: i64, set: &NewSet) -> Result<WorkoutSet, String> {
    post(&format!("/sessions/{}/sets", session_id), set).await
}

pub async fn update_set(id: i64, set: &NewSet) -> Result<(), String> {
    put(&format!("/sets/{}", id), set).await
}

pub async fn delete_set(id: i64) -> Result<(), String> {
    delete(&format!("/sets/{}", id)).await
}

pub async fn list_routines() -> Result<Vec<Routine>, String> {
    get("/routines").await
}

pub async fn create_routine(name: &str, exercise_ids: Vec<i64>) -> Result<Routine, String> {
    let body = NewRoutine {
        name: name.to_string(),
        exercise_ids,
        ..Default::default()
    };
    post("/routines", &body).await
}

pub async fn delete_routine(id: i64) -> Result<(), String> {
    delete(&format!("/routines/{}", id)).await
}

// ============ Running ============

pub async fn list_runs() -> Result<Vec<Run>, String> {
    get("/runs").await
}

pub async fn get_run(id: i64) -> Result<Run, String> {
    get(&format!("/runs/{}", id)).await
}

pub async fn create_run(run: &NewRun) -> Result<Run, String> {
    post("/runs", run).await
}

pub async fn delete_run(id: i64) -> Result<(), String> {
    delete(&format!("/runs/{}", id)).await
}

pub async fn list_shoes() -> Result<Vec<Shoe>, String> {
    get("/shoes").await
}

pub async fn create_shoe(brand: &str, model: &str) -> Result<Shoe, String> {
    let body = NewShoe {
        brand: brand.to_string(),
        model: model.to_string(),
    };
    post("/shoes", &body).await
}

// ============ Nutrition ============

pub async fn list_meals() -> Result<Vec<Meal>, String> {
    get("/meals").await
}

pub async fn create_meal(meal: &NewMeal) -> Result<Meal, String> {
    post("/meals", meal).await
}

pub async fn update_meal(id: i64, name: &str) -> Result<(), String> {
    put(
        &format!("/meals/{}", id),
        &RenameMeal {
            name: name.to_string(),
        },
    )
    .await
}

pub async fn delete_meal(id: i64) -> Result<(), String> {
    delete(&format!("/meals/{}", id)).await
}

pub async fn add_entry(meal_id: i64, entry: &NewFoodEntry) -> Result<FoodEntry, String> {
    post(&format!("/meals/{}/entries", meal_id), entry).await
}

pub async fn delete_entry(id: i64) -> Result<(), String> {
    delete(&format!("/meals/entries/{}", id)).await
}

pub async fn list_library() -> Result<Vec<FoodLibraryItem>, String> {
    get("/nutrition/library").await
}

pub async fn create_library_item(item: &NewLibraryItem) -> Result<FoodLibraryItem, String> {
    post("/nutrition/library", item).await
}

pub async fn log_water(amount_ml: i64) -> Result<(), String> {
    post::<_, serde_json::Value>("/nutrition/water", &WaterLog { amount_ml })
        .await
        .map(|_| ())
}

// ============ Body ============

pub async fn list_body_metrics() -> Result<Vec<BodyMetric>, String> {
    get("/body/metrics").await
}

pub async fn create_body_metric(metric: &NewBodyMetric) -> Result<BodyMetric, String> {
    post("/body/metrics", metric).await
}

// ============ Analytics ============

/// Daily summaries, newest first
pub async fn daily(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Vec<DailySummary>, String> {
    let mut query = Vec::new();
    if let Some(start) = start {
        query.push(("start", start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = end {
        query.push(("end", end.format("%Y-%m-%d").to_string()));
    }
    let builder = with_cookie(Request::get(&url("/analytics/daily")))
        .query(query.iter().map(|(k, v)| (*k, v.as_str())));
    send(builder.build()).await
}

// ============ Auth ============

pub async fn phone_login(id_token: &str, phone_number: &str) -> Result<AuthResponse, String> {
    let body = PhoneLogin {
        id_token: id_token.to_string(),
        phone_number: phone_number.to_string(),
    };
    post("/auth/phone", &body).await
}

/// Expire the session cookie. The server answers with a redirect, which
/// fetch follows; any response that is not an error counts as success.
pub async fn logout() -> Result<(), String> {
    let response = with_cookie(Request::get(&url("/auth/logout")))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    read(response).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(404, ""), "Error 404");
        assert_eq!(error_message(400, "  \n"), "Error 400");
        assert_eq!(error_message(500, "boom"), "boom");
    }

    #[test]
    fn test_decode_body_defaults() {
        let empty: Vec<Meal> = decode_body("");
        assert!(empty.is_empty());

        let malformed: Vec<Run> = decode_body("{not json");
        assert!(malformed.is_empty());

        let user: User = decode_body(r#"{"id": 3, "name": "Ada"}"#);
        assert_eq!(user.id, 3);
        assert_eq!(user.name, "Ada");
    }
}
