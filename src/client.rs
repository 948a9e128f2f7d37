//! Fitlog REST API Client
//!
//! Typed HTTP client for the `/api` surface. Non-2xx responses become
//! [`ClientError::Api`] carrying the response text (or `Error {status}`
//! when the body is empty). An empty 2xx body decodes to the type's
//! default, and a malformed one is logged and replaced by the default.

use chrono::NaiveDate;
use reqwest::{header, redirect, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

use fitlog_core::models::{
    AuthResponse, BodyMetric, DailySummary, Exercise, FinishSession, FoodEntry, FoodLibraryItem,
    Meal, NewBodyMetric, NewExercise, NewFoodEntry, NewLibraryItem, NewMeal, NewRoutine, NewRun,
    NewSession, NewSet, NewShoe, PhoneLogin, RenameMeal, Routine, Run, Shoe, User, UserPayload,
    WaterLog, WorkoutSession, WorkoutSet,
};

use crate::auth::COOKIE_NAME;

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL including the `/api` prefix
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Session token sent as the `auth_token` cookie
    pub session_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            request_timeout_ms: 10_000,
            session_token: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Server unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::Unavailable
        } else {
            ClientError::Request(e)
        }
    }
}

/// Message for a failed response: the body text, or `Error {status}` when blank
pub fn error_message(status: StatusCode, text: &str) -> String {
    if text.trim().is_empty() {
        format!("Error {}", status.as_u16())
    } else {
        text.to_string()
    }
}

/// Decode a successful body, falling back to the default when empty or malformed
pub fn decode_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed response body, using default");
            T::default()
        }
    }
}

fn session_from_set_cookie(value: &str) -> Option<String> {
    value
        .split(';')
        .next()
        .and_then(|pair| pair.trim().split_once('='))
        .filter(|(name, token)| *name == COOKIE_NAME && !token.is_empty())
        .map(|(_, token)| token.to_string())
}

/// REST client for a fitlog server
pub struct FitlogClient {
    client: Client,
    config: ClientConfig,
    session: RwLock<Option<String>>,
}

impl FitlogClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            session: RwLock::new(config.session_token.clone()),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current session token, if signed in
    pub fn session_token(&self) -> Option<String> {
        self.session.read().ok().and_then(|s| s.clone())
    }

    fn set_session_token(&self, token: Option<String>) {
        if let Ok(mut session) = self.session.write() {
            *session = token;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session_token() {
            Some(token) => request.header(header::COOKIE, format!("{COOKIE_NAME}={token}")),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = self
            .with_session(request)
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }

    async fn fetch<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        Ok(decode_body(&bytes))
    }

    async fn get<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ClientError> {
        self.fetch(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.fetch(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        self.execute(self.client.put(self.url(path)).json(body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    // ==================== Identity ====================

    pub async fn get_user(&self) -> Result<User, ClientError> {
        self.get("/user").await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ClientError> {
        self.post("/user", payload).await
    }

    pub async fn update_user(&self, payload: &UserPayload) -> Result<User, ClientError> {
        self.fetch(self.client.put(self.url("/user")).json(payload)).await
    }

    // ==================== Resistance ====================

    pub async fn list_exercises(&self) -> Result<Vec<Exercise>, ClientError> {
        self.get("/exercises").await
    }

    pub async fn create_exercise(&self, exercise: &NewExercise) -> Result<Exercise, ClientError> {
        self.post("/exercises", exercise).await
    }

    pub async fn list_sessions(&self) -> Result<Vec<WorkoutSession>, ClientError> {
        self.get("/sessions").await
    }

    pub async fn get_session(&self, id: i64) -> Result<WorkoutSession, ClientError> {
        self.get(&format!("/sessions/{id}")).await
    }

    pub async fn create_session(&self, session: &NewSession) -> Result<WorkoutSession, ClientError> {
        self.post("/sessions", session).await
    }

    pub async fn finish_session(&self, id: i64, end_time: chrono::DateTime<chrono::Utc>) -> Result<(), ClientError> {
        let body = FinishSession { end_time: Some(end_time) };
        self.execute(self.client.post(self.url(&format!("/sessions/{id}/finish"))).json(&body))
            .await?;
        Ok(())
    }

    pub async fn delete_session(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/sessions/{id}")).await
    }

    pub async fn add_set(&self, session_id: i64, set: &NewSet) -> Result<WorkoutSet, ClientError> {
        self.post(&format!("/sessions/{session_id}/sets"), set).await
    }

    pub async fn update_set(&self, id: i64, set: &NewSet) -> Result<(), ClientError> {
        self.put(&format!("/sets/{id}"), set).await
    }

    pub async fn delete_set(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/sets/{id}")).await
    }

    pub async fn list_routines(&self) -> Result<Vec<Routine>, ClientError> {
        self.get("/routines").await
    }

    pub async fn create_routine(&self, name: &str, exercise_ids: Vec<i64>) -> Result<Routine, ClientError> {
        let body = NewRoutine {
            name: name.to_string(),
            notes: None,
            exercise_ids,
        };
        self.post("/routines", &body).await
    }

    pub async fn delete_routine(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/routines/{id}")).await
    }

    // ==================== Running ====================

    pub async fn list_runs(&self) -> Result<Vec<Run>, ClientError> {
        self.get("/runs").await
    }

    pub async fn get_run(&self, id: i64) -> Result<Run, ClientError> {
        self.get(&format!("/runs/{id}")).await
    }

    pub async fn create_run(&self, run: &NewRun) -> Result<Run, ClientError> {
        self.post("/runs", run).await
    }

    pub async fn delete_run(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/runs/{id}")).await
    }

    pub async fn list_shoes(&self) -> Result<Vec<Shoe>, ClientError> {
        self.get("/shoes").await
    }

    pub async fn create_shoe(&self, brand: &str, model: &str) -> Result<Shoe, ClientError> {
        let body = NewShoe {
            brand: brand.to_string(),
            model: model.to_string(),
        };
        self.post("/shoes", &body).await
    }

    // ==================== Nutrition ====================

    pub async fn list_meals(&self) -> Result<Vec<Meal>, ClientError> {
        self.get("/meals").await
    }

    pub async fn create_meal(&self, meal: &NewMeal) -> Result<Meal, ClientError> {
        self.post("/meals", meal).await
    }

    pub async fn update_meal(&self, id: i64, name: &str) -> Result<(), ClientError> {
        let body = RenameMeal { name: name.to_string() };
        self.put(&format!("/meals/{id}"), &body).await
    }

    pub async fn delete_meal(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/meals/{id}")).await
    }

    pub async fn add_entry(&self, meal_id: i64, entry: &NewFoodEntry) -> Result<FoodEntry, ClientError> {
        self.post(&format!("/meals/{meal_id}/entries"), entry).await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), ClientError> {
        self.delete(&format!("/meals/entries/{id}")).await
    }

    pub async fn list_library(&self) -> Result<Vec<FoodLibraryItem>, ClientError> {
        self.get("/nutrition/library").await
    }

    pub async fn create_library_item(&self, item: &NewLibraryItem) -> Result<FoodLibraryItem, ClientError> {
        self.post("/nutrition/library", item).await
    }

    pub async fn log_water(&self, amount_ml: i64) -> Result<(), ClientError> {
        let body = WaterLog { amount_ml };
        self.execute(self.client.post(self.url("/nutrition/water")).json(&body))
            .await?;
        Ok(())
    }

    // ==================== Body ====================

    pub async fn list_body_metrics(&self) -> Result<Vec<BodyMetric>, ClientError> {
        self.get("/body/metrics").await
    }

    pub async fn create_body_metric(&self, metric: &NewBodyMetric) -> Result<BodyMetric, ClientError> {
        self.post("/body/metrics", metric).await
    }

    // ==================== Analytics ====================

    /// Daily summaries, newest first. Server defaults cover the last 30 days.
    pub async fn daily(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DailySummary>, ClientError> {
        let mut query = Vec::new();
        if let Some(start) = start {
            query.push(("start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = end {
            query.push(("end", end.format("%Y-%m-%d").to_string()));
        }
        self.fetch(self.client.get(self.url("/analytics/daily")).query(&query))
            .await
    }

    // ==================== Auth ====================

    /// Sign in with a phone ID token; the returned session is kept for later calls
    pub async fn phone_login(&self, id_token: &str, phone_number: &str) -> Result<AuthResponse, ClientError> {
        let body = PhoneLogin {
            id_token: id_token.to_string(),
            phone_number: phone_number.to_string(),
        };
        let response = self
            .execute(self.client.post(self.url("/auth/phone")).json(&body))
            .await?;

        let token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(session_from_set_cookie);
        if token.is_some() {
            self.set_session_token(token);
        }

        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        Ok(decode_body(&bytes))
    }

    /// Expire the server cookie and forget the local session
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .with_session(self.client.get(self.url("/auth/logout")))
            .send()
            .await
            .map_err(ClientError::from_reqwest)?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        self.set_session_token(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert!(config.session_token.is_none());
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Error 404");
        assert_eq!(error_message(StatusCode::BAD_REQUEST, "  \n"), "Error 400");
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, "Name is required"),
            "Name is required"
        );
    }

    #[test]
    fn test_empty_body_decodes_to_default() {
        let meals: Vec<Meal> = decode_body(b"");
        assert!(meals.is_empty());
        let user: User = decode_body(b"   ");
        assert_eq!(user, User::default());
    }

    #[test]
    fn test_malformed_body_decodes_to_default() {
        let runs: Vec<Run> = decode_body(b"{not json");
        assert!(runs.is_empty());
    }

    #[test]
    fn test_session_cookie_parsing() {
        assert_eq!(
            session_from_set_cookie("auth_token=abc; Path=/; HttpOnly").as_deref(),
            Some("abc")
        );
        assert_eq!(session_from_set_cookie("auth_token=; Max-Age=0"), None);
        assert_eq!(session_from_set_cookie("other=abc"), None);
    }

    #[test]
    fn test_url_join() {
        let client = FitlogClient::new(ClientConfig {
            base_url: "http://example.test/api/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.url("/meals"), "http://example.test/api/meals");
    }

    async fn spawn_server() -> String {
        use crate::api::{build_router, AppState};
        use crate::config::Config;
        use crate::storage::Store;
        use std::sync::Arc;

        let mut config = Config::default();
        config.auth.required = false;
        let store = Arc::new(Store::open_in_memory().unwrap());
        let app = build_router(AppState::new(store, config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    #[tokio::test]
    async fn test_meal_flow_against_server() {
        let base_url = spawn_server().await;
        let client = FitlogClient::new(ClientConfig { base_url, ..Default::default() }).unwrap();

        let meal = client
            .create_meal(&NewMeal { name: Some("Lunch".into()), eaten_at: None })
            .await
            .unwrap();
        client
            .add_entry(meal.id, &NewFoodEntry { name: "Rice".into(), calories: 200, ..Default::default() })
            .await
            .unwrap();
        client.update_meal(meal.id, "Dinner").await.unwrap();
        client.log_water(250).await.unwrap();

        let meals = client.list_meals().await.unwrap();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name.as_deref(), Some("Dinner"));
        assert_eq!(meals[0].entries.len(), 1);

        let today = chrono::Utc::now().date_naive();
        let days = client.daily(Some(today), Some(today)).await.unwrap();
        assert_eq!(days[0].water_ml, 250);
        assert_eq!(days[0].total_calories, 200);
    }

    #[tokio::test]
    async fn test_server_error_carries_status() {
        let base_url = spawn_server().await;
        let client = FitlogClient::new(ClientConfig { base_url, ..Default::default() }).unwrap();

        match client.delete_run(999).await {
            Err(ClientError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert!(message.contains("not found"));
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let client = FitlogClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9/api".into(),
            request_timeout_ms: 2_000,
            session_token: None,
        })
        .unwrap();

        let err = client.list_meals().await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable | ClientError::Timeout));
    }
}
