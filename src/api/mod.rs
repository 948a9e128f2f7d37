//! Fitlog REST API
//!
//! HTTP API layer for fitlog, built with Axum. Every route lives under
//! `/api`; all of them except `/api/health` and `/api/auth/*` require the
//! `auth_token` session cookie.
//!
//! # Endpoints
//!
//! ## Identity
//! - `GET /api/user`, `POST /api/user`, `PUT /api/user`
//!
//! ## Resistance training
//! - `GET|POST /api/exercises`
//! - `GET|POST /api/sessions`, `GET|DELETE /api/sessions/:id`
//! - `POST /api/sessions/:id/finish`, `POST /api/sessions/:id/sets`
//! - `PUT|DELETE /api/sets/:id`
//! - `GET|POST /api/routines`, `DELETE /api/routines/:id`
//!
//! ## Running
//! - `GET|POST /api/runs`, `GET|DELETE /api/runs/:id`
//! - `GET|POST /api/shoes`
//!
//! ## Nutrition
//! - `GET|POST /api/meals`, `PUT|DELETE /api/meals/:id`
//! - `POST /api/meals/:id/entries`, `DELETE /api/meals/entries/:id`
//! - `GET|POST /api/nutrition/library`, `POST /api/nutrition/water`
//!
//! ## Body and analytics
//! - `GET|POST /api/body/metrics`
//! - `GET /api/analytics/daily?start&end`
//!
//! ## Auth
//! - `GET /api/auth/google/login`, `GET /api/auth/google/callback`
//! - `GET /api/auth/logout`, `POST /api/auth/phone`
//!
//! ## Health
//! - `GET /api/health`
//!
//! # Example
//!
//! ```rust,ignore
//! use fitlog::api::{serve, AppState};
//! use fitlog::config::Config;
//! use fitlog::storage::Store;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let store = Arc::new(Store::open(&config.storage.db_path)?);
//!     serve(AppState::new(store, config)).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use session::AuthUser;
pub use state::AppState;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    let protected = Router::new()
        // Identity
        .route(
            "/user",
            get(routes::identity::get_user)
                .post(routes::identity::create_user)
                .put(routes::identity::update_user),
        )
        // Resistance training
        .route(
            "/exercises",
            get(routes::resistance::list_exercises).post(routes::resistance::create_exercise),
        )
        .route(
            "/sessions",
            get(routes::resistance::list_sessions).post(routes::resistance::create_session),
        )
        .route(
            "/sessions/:id",
            get(routes::resistance::get_session).delete(routes::resistance::delete_session),
        )
        .route("/sessions/:id/finish", post(routes::resistance::finish_session))
        .route("/sessions/:id/sets", post(routes::resistance::add_set))
        .route(
            "/sets/:id",
            put(routes::resistance::update_set).delete(routes::resistance::delete_set),
        )
        .route(
            "/routines",
            get(routes::resistance::list_routines).post(routes::resistance::create_routine),
        )
        .route("/routines/:id", delete(routes::resistance::delete_routine))
        // Running
        .route(
            "/runs",
            get(routes::running::list_runs).post(routes::running::create_run),
        )
        .route(
            "/runs/:id",
            get(routes::running::get_run).delete(routes::running::delete_run),
        )
        .route(
            "/shoes",
            get(routes::running::list_shoes).post(routes::running::create_shoe),
        )
        // Nutrition
        .route(
            "/meals",
            get(routes::nutrition::list_meals).post(routes::nutrition::create_meal),
        )
        .route(
            "/meals/:id",
            put(routes::nutrition::rename_meal).delete(routes::nutrition::delete_meal),
        )
        .route("/meals/:id/entries", post(routes::nutrition::add_entry))
        .route("/meals/entries/:id", delete(routes::nutrition::delete_entry))
        .route(
            "/nutrition/library",
            get(routes::nutrition::list_library).post(routes::nutrition::create_library_item),
        )
        .route("/nutrition/water", post(routes::nutrition::log_water))
        // Body and analytics
        .route(
            "/body/metrics",
            get(routes::body::list_body_metrics).post(routes::body::create_body_metric),
        )
        .route("/analytics/daily", get(routes::analytics::daily))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            session::require_session,
        ));

    let public = Router::new()
        .route("/health", get(routes::health::health))
        .route("/auth/google/login", get(routes::auth::google_login))
        .route("/auth/google/callback", get(routes::auth::google_callback))
        .route("/auth/logout", get(routes::auth::logout))
        .route("/auth/phone", post(routes::auth::phone_login));

    let cors = cors_layer(&shared_state.config.api);

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Credentialed CORS for the configured origins; permissive when none are set
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Fitlog API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Fitlog API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{issue_token, AuthError, TokenVerifier, VerifiedIdentity};
    use crate::config::Config;
    use crate::storage::Store;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response, StatusCode},
    };
    use fitlog_core::models::{AuthResponse, DailySummary, Meal, Run, User};
    use tower::util::ServiceExt;

    const SECRET: &str = "test-secret";

    /// Accepts `good-<sub>` and `good-<sub>@<phone>` tokens
    struct FakeVerifier;

    #[async_trait]
    impl TokenVerifier for FakeVerifier {
        async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
            let claims = id_token
                .strip_prefix("good-")
                .ok_or_else(|| AuthError::InvalidToken("rejected".into()))?;
            let (subject, phone) = match claims.split_once('@') {
                Some((sub, phone)) => (sub, Some(phone.to_string())),
                None => (claims, None),
            };
            Ok(VerifiedIdentity {
                subject: subject.to_string(),
                phone_number: phone,
            })
        }
    }

    async fn phone_login(app: &Router, id_token: &str, phone: &str) -> Response<Body> {
        let body = format!(r#"{{"idToken":"{id_token}","phoneNumber":"{phone}"}}"#);
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/phone")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    fn create_test_app() -> Router {
        let mut config = Config::default();
        config.auth.jwt_secret = SECRET.to_string();
        config.auth.frontend_url = "/home".to_string();
        let store = Arc::new(Store::open_in_memory().unwrap());
        let state = AppState::new(store, config).with_verifier(Arc::new(FakeVerifier));
        build_router(state)
    }

    fn cookie(user_id: i64) -> String {
        format!("auth_token={}", issue_token(user_id, SECRET, 7).unwrap())
    }

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Cookie", cookie(1));
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthorized() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/api/meals").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_cookie_is_unauthorized() {
        let app = create_test_app();
        let forged = issue_token(1, "someone-else", 7).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/user")
                    .header("Cookie", format!("auth_token={forged}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_user_returns_seeded_profile() {
        let app = create_test_app();

        let response = app.oneshot(request("GET", "/api/user", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let user: User = json(response).await;
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "User");
    }

    #[tokio::test]
    async fn test_meal_round_trip() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(request("POST", "/api/meals", Some(r#"{"name":"Lunch"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let meal: Meal = json(response).await;

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/meals/{}/entries", meal.id),
                Some(r#"{"name":"Rice","calories":200,"protein_g":4}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request("PUT", &format!("/api/meals/{}", meal.id), Some(r#"{"name":"Dinner"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());

        let response = app.oneshot(request("GET", "/api/meals", None)).await.unwrap();
        let meals: Vec<Meal> = json(response).await;
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].name.as_deref(), Some("Dinner"));
        assert_eq!(meals[0].entries[0].calories, 200);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(request("DELETE", "/api/runs/999", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_defaults_type() {
        let app = create_test_app();

        let response = app
            .oneshot(request(
                "POST",
                "/api/runs",
                Some(r#"{"duration_seconds":1500,"distance_meters":5000}"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let run: Run = json(response).await;
        assert_eq!(run.run_type.as_deref(), Some("Run"));
    }

    #[tokio::test]
    async fn test_malformed_route_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(request(
                "POST",
                "/api/runs",
                Some(r#"{"duration_seconds":10,"distance_meters":5,"route_data":"not json"}"#),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_daily_range() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(request("GET", "/api/analytics/daily?start=2024-03-01&end=2024-03-07", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let days: Vec<DailySummary> = json(response).await;
        assert_eq!(days.len(), 7);

        let response = app
            .oneshot(request("GET", "/api/analytics/daily?start=2024-03-07&end=2024-03-01", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_phone_login_sets_cookie() {
        let app = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/phone")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"idToken":"good-uid-7","phoneNumber":"+15550100"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("auth_token="));
        assert!(set_cookie.contains("HttpOnly"));

        let body: AuthResponse = json(response).await;
        assert!(body.success);

        // The issued cookie opens protected routes as the new user
        let session = set_cookie.split(';').next().unwrap().to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/user")
                    .header("Cookie", session)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let user: User = json(response).await;
        assert_eq!(user.id, body.user.id);
    }

    #[tokio::test]
    async fn test_phone_login_rejects_bad_input() {
        let app = create_test_app();

        let missing = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/phone")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"idToken":"good-x"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let rejected = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/phone")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"idToken":"forged","phoneNumber":"+15550100"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_phone_owned_by_first_identity() {
        let app = create_test_app();

        let alice = phone_login(&app, "good-alice", "+15550100").await;
        assert_eq!(alice.status(), StatusCode::OK);
        let alice: AuthResponse = json(alice).await;

        // Another valid token cannot claim the same number
        let mallory = phone_login(&app, "good-mallory", "+15550100").await;
        assert_eq!(mallory.status(), StatusCode::UNAUTHORIZED);
        assert!(mallory.headers().get("set-cookie").is_none());

        let again = phone_login(&app, "good-alice", "+15550100").await;
        let again: AuthResponse = json(again).await;
        assert_eq!(again.user.id, alice.user.id);
    }

    #[tokio::test]
    async fn test_phone_must_match_token_claim() {
        let app = create_test_app();

        let other = phone_login(&app, "good-bob@+15550199", "+15550100").await;
        assert_eq!(other.status(), StatusCode::UNAUTHORIZED);

        let same = phone_login(&app, "good-bob@+15550199", "+15550199").await;
        assert_eq!(same.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_google_login_sets_state_cookie() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/google/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        let state = set_cookie
            .strip_prefix("oauth_state=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert!(!state.is_empty());
        let location = response.headers().get("location").unwrap().to_str().unwrap();
        assert!(location.contains(&format!("state={state}")));
    }

    #[tokio::test]
    async fn test_google_callback_requires_matching_state() {
        let app = create_test_app();

        let missing = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/google/callback?code=abc&state=s1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let forged = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/google/callback?code=abc&state=attacker")
                    .header("Cookie", "oauth_state=s1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_expires_cookie_and_redirects() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/api/auth/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers().get("location").unwrap(), "/home");
        let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_sessions_disabled_act_as_first_user() {
        let mut config = Config::default();
        config.auth.required = false;
        let store = Arc::new(Store::open_in_memory().unwrap());
        let app = build_router(AppState::new(store, config));

        let response = app
            .oneshot(Request::builder().uri("/api/user").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let user: User = json(response).await;
        assert_eq!(user.id, 1);
    }
}
