//! Auth Routes (no session required)
//!
//! - GET /api/auth/google/login - Redirect to Google's consent page with a fresh state
//! - GET /api/auth/google/callback - Check state, finish Google sign-in, set cookie, redirect home
//! - GET /api/auth/logout - Clear the cookie, redirect home
//! - POST /api/auth/phone - Exchange a verified phone ID token for a session

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};
use std::sync::Arc;

use fitlog_core::models::{AuthResponse, PhoneLogin};

use crate::api::dto::OAuthCallbackQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::{
    check_oauth_state, expired_cookie, expired_state_cookie, issue_token, new_oauth_state,
    session_cookie, state_cookie, AuthError,
};

fn session_header(state: &AppState, user_id: i64) -> Result<String, AuthError> {
    let auth = &state.config.auth;
    let token = issue_token(user_id, &auth.jwt_secret, auth.token_days)?;
    Ok(session_cookie(&token, auth.token_days))
}

pub async fn google_login(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let oauth_state = new_oauth_state();
    (
        AppendHeaders([(SET_COOKIE, state_cookie(&oauth_state))]),
        Redirect::temporary(&state.google.consent_url(&oauth_state)),
    )
}

pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> ApiResult<impl IntoResponse> {
    check_oauth_state(&headers, query.state.as_deref())?;

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("Code not found".into()))?;

    let profile = state.google.profile_for_code(&code).await?;
    let user = state
        .db(move |s| s.user_by_google_id(&profile.id, &profile.email, &profile.name))
        .await?;
    tracing::info!(user_id = user.id, "Google sign-in");

    let cookie = session_header(&state, user.id)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie), (SET_COOKIE, expired_state_cookie())]),
        Redirect::temporary(&state.config.auth.frontend_url),
    ))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, expired_cookie())]),
        Redirect::temporary(&state.config.auth.frontend_url),
    )
}

pub async fn phone_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PhoneLogin>,
) -> ApiResult<impl IntoResponse> {
    if req.id_token.is_empty() || req.phone_number.is_empty() {
        return Err(ApiError::Validation(
            "idToken and phoneNumber are required".into(),
        ));
    }

    let identity = state
        .verifier
        .verify(&req.id_token)
        .await
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    // A token that names a phone only signs in that phone
    if identity
        .phone_number
        .as_deref()
        .is_some_and(|verified| verified != req.phone_number)
    {
        return Err(ApiError::Unauthorized(
            "token was issued for another phone number".into(),
        ));
    }

    let phone = req.phone_number;
    let user = state
        .db(move |s| s.user_by_phone(&phone, &identity.subject))
        .await?;
    tracing::info!(user_id = user.id, "Phone sign-in");

    let cookie = session_header(&state, user.id)?;
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(AuthResponse { success: true, user }),
    ))
}
