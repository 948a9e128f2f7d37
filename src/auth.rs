//! Session tokens and sign-in providers
//!
//! Sessions are HS256 JWTs carried in an `auth_token` HttpOnly cookie.
//! Phone sign-in verifies a provider ID token through a [`TokenVerifier`];
//! Google sign-in runs the OAuth authorization-code flow, bound to the
//! browser by a one-shot `oauth_state` cookie.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// Name of the session cookie
pub const COOKIE_NAME: &str = "auth_token";

/// Cookie holding the pending OAuth `state`
pub const STATE_COOKIE_NAME: &str = "oauth_state";

/// Seconds a consent round trip may take
const STATE_MAX_AGE: i64 = 600;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_TOKENINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/tokeninfo";
const GOOGLE_SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.profile https://www.googleapis.com/auth/userinfo.email";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing session cookie")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
}

/// Sign a session token for `user_id` valid for `days`
pub fn issue_token(user_id: i64, secret: &str, days: i64) -> Result<String, AuthError> {
    let claims = Claims {
        user_id,
        exp: (Utc::now() + Duration::days(days)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Validate signature and expiry, returning the user id
pub fn verify_token(token: &str, secret: &str) -> Result<i64, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.user_id)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str, days: i64) -> String {
    let max_age = days * 24 * 60 * 60;
    format!("{COOKIE_NAME}={token}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the session
pub fn expired_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax")
}

/// Pull the session token out of the request's `Cookie` headers
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, COOKIE_NAME)
}

fn cookie_value(headers: &HeaderMap, cookie: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

// ==================== OAuth state ====================

/// Fresh unguessable `state` for one consent round trip
pub fn new_oauth_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// `Set-Cookie` value remembering `state` until the callback
pub fn state_cookie(state: &str) -> String {
    format!("{STATE_COOKIE_NAME}={state}; Path=/api/auth; Max-Age={STATE_MAX_AGE}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the pending state
pub fn expired_state_cookie() -> String {
    format!("{STATE_COOKIE_NAME}=; Path=/api/auth; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// The callback's `state` must echo the one set on this browser
pub fn check_oauth_state(headers: &HeaderMap, returned: Option<&str>) -> Result<(), AuthError> {
    let expected = cookie_value(headers, STATE_COOKIE_NAME)
        .ok_or_else(|| AuthError::InvalidToken("no sign-in in progress".into()))?;
    match returned {
        Some(state) if state == expected => Ok(()),
        _ => Err(AuthError::InvalidToken("OAuth state mismatch".into())),
    }
}

// ==================== Phone sign-in ====================

/// Identity proven by a verified provider token
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    /// Provider subject, stored as the user's firebase uid
    pub subject: String,
    /// Phone number the provider verified, when the token carries one
    pub phone_number: Option<String>,
}

/// Checks a provider-issued ID token
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError>;
}

#[derive(Debug, Default, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    sub: String,
    #[serde(default)]
    aud: String,
    #[serde(default)]
    phone_number: Option<String>,
}

impl TokenInfo {
    fn into_identity(self, audience: Option<&str>) -> Result<VerifiedIdentity, AuthError> {
        if self.sub.is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".into()));
        }
        if let Some(expected) = audience {
            if self.aud != expected {
                return Err(AuthError::InvalidToken(format!(
                    "token issued for {:?}",
                    self.aud
                )));
            }
        }
        Ok(VerifiedIdentity {
            subject: self.sub,
            phone_number: self.phone_number.filter(|p| !p.is_empty()),
        })
    }
}

/// Verifies ID tokens against Google's tokeninfo endpoint
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    endpoint: String,
    audience: Option<String>,
}

impl GoogleTokenInfo {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
            audience: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Only accept tokens whose `aud` is this project; empty accepts any
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.audience = Some(audience.to_string()).filter(|a| !a.is_empty());
        self
    }
}

#[async_trait]
impl TokenVerifier for GoogleTokenInfo {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let url = format!("{}?id_token={}", self.endpoint, urlencoding::encode(id_token));
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response.json().await?;
        info.into_identity(self.audience.as_deref())
    }
}

// ==================== Google OAuth ====================

/// Profile returned by Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GoogleProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// Authorization-code flow against Google
pub struct GoogleOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleOAuth {
    pub fn new(client: reqwest::Client, config: &AuthConfig) -> Self {
        Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url.clone(),
        }
    }

    /// Provider consent page the browser is sent to
    pub fn consent_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&access_type=offline",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode(GOOGLE_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for the signed-in profile
    pub async fn profile_for_code(&self, code: &str) -> Result<GoogleProfile, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(GOOGLE_TOKEN_URL).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider(format!(
                "code exchange failed ({status}): {error_text}"
            )));
        }
        let token: GoogleTokenResponse = response.json().await?;

        let url = format!(
            "{}?access_token={}",
            GOOGLE_USERINFO_URL,
            urlencoding::encode(&token.access_token)
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "userinfo returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_roundtrip() {
        let token = issue_token(42, "secret", 7).unwrap();
        assert_eq!(verify_token(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(42, "secret", 7).unwrap();
        assert!(matches!(
            verify_token(&token, "other"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(42, "secret", -2).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc.def.ghi"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("auth_token="));
        assert_eq!(token_from_headers(&empty), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", 7);
        assert!(cookie.starts_with("auth_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(expired_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_consent_url() {
        let config = AuthConfig {
            google_client_id: "client-1".into(),
            ..Default::default()
        };
        let oauth = GoogleOAuth::new(reqwest::Client::new(), &config);
        let url = oauth.consent_url("abc123");
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("client_id=client-1"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("userinfo.email"));
    }

    #[test]
    fn test_oauth_state_is_fresh_and_checked() {
        let state = new_oauth_state();
        assert_ne!(state, new_oauth_state());
        assert!(state_cookie(&state).contains("HttpOnly"));
        assert!(expired_state_cookie().contains("Max-Age=0"));

        let mut headers = HeaderMap::new();
        let cookie = format!("{STATE_COOKIE_NAME}={state}");
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());

        assert!(check_oauth_state(&headers, Some(&state)).is_ok());
        assert!(check_oauth_state(&headers, Some("forged")).is_err());
        assert!(check_oauth_state(&headers, None).is_err());
        assert!(check_oauth_state(&HeaderMap::new(), Some(&state)).is_err());
    }

    #[test]
    fn test_token_info_audience_and_phone() {
        let info = || TokenInfo {
            sub: "uid-1".into(),
            aud: "fitlog-prod".into(),
            phone_number: Some("+15550100".into()),
        };

        let identity = info().into_identity(Some("fitlog-prod")).unwrap();
        assert_eq!(identity.subject, "uid-1");
        assert_eq!(identity.phone_number.as_deref(), Some("+15550100"));

        assert!(info().into_identity(Some("other-project")).is_err());
        assert!(info().into_identity(None).is_ok());

        let anonymous = TokenInfo { sub: String::new(), ..info() };
        assert!(anonymous.into_identity(None).is_err());
    }
}
