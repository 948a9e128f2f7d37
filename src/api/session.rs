//! Session middleware
//!
//! Validates the `auth_token` cookie on protected routes and makes the
//! caller available to handlers through the [`AuthUser`] extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::{token_from_headers, verify_token, AuthError};

/// User id every request acts as when sessions are switched off
pub const ANONYMOUS_USER_ID: i64 = 1;

/// The authenticated caller
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Reject requests without a valid session cookie
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = if state.config.auth.required {
        let token = match token_from_headers(request.headers()) {
            Some(token) => token,
            None => return ApiError::from(AuthError::MissingToken).into_response(),
        };
        match verify_token(&token, &state.config.auth.jwt_secret) {
            Ok(user_id) => user_id,
            Err(e) => return ApiError::from(e).into_response(),
        }
    } else {
        ANONYMOUS_USER_ID
    };

    request.extensions_mut().insert(AuthUser { user_id });
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".into()))
    }
}
