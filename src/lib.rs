//! # Fitlog
//!
//! Personal fitness tracker: resistance training, runs with live GPS
//! tracking, meals and nutrition, body metrics and daily analytics.
//!
//! Pure domain logic (timer, tracker, splits, energy targets) lives in
//! [`fitlog_core`]; this crate adds the pieces that do I/O.
//!
//! ## Modules
//!
//! - [`storage`]: SQLite persistence
//! - [`api`]: REST API server with Axum and cookie sessions
//! - [`auth`]: Session tokens and sign-in providers
//! - [`client`]: Typed REST client
//! - [`timer`]: Tokio-driven rest clock
//! - [`replay`]: Feed recorded sensor traces through the live tracker
//! - [`config`]: TOML configuration with environment overrides
//! - [`logging`]: Tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fitlog::storage::Store;
//! use fitlog_core::models::NewRun;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::open("fitlog.db")?;
//!
//!     let run = store.create_run(1, NewRun {
//!         duration_seconds: 1500,
//!         distance_meters: 5000.0,
//!         ..Default::default()
//!     })?;
//!     println!("Recorded run {} ({})", run.id, run.run_type.unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod logging;
pub mod replay;
pub mod storage;
pub mod timer;

pub use api::{build_router, serve, ApiError, AppState, AuthUser};

pub use auth::{AuthError, GoogleOAuth, GoogleTokenInfo, TokenVerifier, VerifiedIdentity};

pub use client::{ClientConfig, ClientError, FitlogClient};

pub use config::{Config, ConfigError, LoggingConfig};

pub use replay::{ReplayError, ReplaySummary, TraceReplayer};

pub use storage::{StorageError, StorageResult, Store, StoreStats};

pub use timer::RestClock;
