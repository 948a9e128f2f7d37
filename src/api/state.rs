//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::error::{ApiError, ApiResult};
use crate::auth::{GoogleOAuth, GoogleTokenInfo, TokenVerifier};
use crate::config::Config;
use crate::storage::{StorageResult, Store};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// SQLite store
    pub store: Arc<Store>,
    /// Full configuration (api, auth, map sections are read by handlers)
    pub config: Arc<Config>,
    /// Phone sign-in token verifier
    pub verifier: Arc<dyn TokenVerifier>,
    /// Google authorization-code flow
    pub google: Arc<GoogleOAuth>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// State with the default Google-backed verifier
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            store,
            verifier: Arc::new(
                GoogleTokenInfo::new(http.clone()).with_audience(&config.auth.phone_audience),
            ),
            google: Arc::new(GoogleOAuth::new(http, &config.auth)),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Swap the phone sign-in verifier
    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run a blocking store call off the async runtime
    pub async fn db<T, F>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&Store) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| ApiError::Internal(format!("storage task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
