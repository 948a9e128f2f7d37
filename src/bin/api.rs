//! Fitlog API Server
//!
//! Run with: cargo run --bin fitlog-api
//!
//! # Configuration
//!
//! Read from `config.toml` in the usual locations (see [`Config::load_default`]),
//! then overridden by environment variables:
//! - `FITLOG_DB_PATH`: SQLite database file
//! - `FITLOG_API_HOST` / `FITLOG_API_PORT`: Bind address (default: 0.0.0.0:8080)
//! - `FITLOG_AUTH_REQUIRED`: `false` makes every request act as user 1
//! - `FITLOG_JWT_SECRET`: Session signing secret
//! - `FITLOG_GOOGLE_CLIENT_ID` / `FITLOG_GOOGLE_CLIENT_SECRET` / `FITLOG_GOOGLE_REDIRECT_URL`
//! - `FITLOG_FRONTEND_URL`: Where sign-in and logout redirect to
//! - `FITLOG_LOG_LEVEL` / `FITLOG_LOG_FORMAT`: Logging (`RUST_LOG` wins when set)

use fitlog::api::{serve, AppState};
use fitlog::config::Config;
use fitlog::storage::Store;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    fitlog::logging::init(&config.logging)?;

    tracing::info!("Starting fitlog API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.storage.db_path);

    if config.auth.jwt_secret == Config::default().auth.jwt_secret {
        tracing::warn!("Using the development JWT secret; set FITLOG_JWT_SECRET in production");
    }
    if !config.auth.required {
        tracing::warn!("Sessions disabled: every request acts as user 1");
    }

    let store = Arc::new(Store::open(&config.storage.db_path)?);
    let stats = store.stats()?;
    tracing::info!(
        users = stats.users,
        sessions = stats.sessions,
        runs = stats.runs,
        meals = stats.meals,
        "Database ready"
    );

    serve(AppState::new(store, config)).await?;

    tracing::info!("Fitlog API server stopped");
    Ok(())
}
