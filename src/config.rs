//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `FITLOG_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("fitlog").join("fitlog.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./fitlog.db".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:8084".to_string(),
                "http://127.0.0.1:8084".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Socket address string for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cookie session and sign-in provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// When false every request acts as user 1 and no cookie is checked
    #[serde(default = "default_auth_required")]
    pub required: bool,

    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_token_days")]
    pub token_days: i64,

    #[serde(default)]
    pub google_client_id: String,

    #[serde(default)]
    pub google_client_secret: String,

    #[serde(default = "default_google_redirect")]
    pub google_redirect_url: String,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Expected `aud` of phone sign-in tokens; empty skips the check
    #[serde(default)]
    pub phone_audience: String,
}

fn default_auth_required() -> bool {
    true
}

fn default_jwt_secret() -> String {
    "default_secret_for_dev_only".to_string()
}

fn default_token_days() -> i64 {
    7
}

fn default_google_redirect() -> String {
    "http://localhost:8080/api/auth/google/callback".to_string()
}

fn default_frontend_url() -> String {
    "/".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: default_auth_required(),
            jwt_secret: default_jwt_secret(),
            token_days: default_token_days(),
            google_client_id: String::new(),
            google_client_secret: String::new(),
            google_redirect_url: default_google_redirect(),
            frontend_url: default_frontend_url(),
            phone_audience: String::new(),
        }
    }
}

/// Map tile source used when drawing run routes
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    #[serde(default)]
    pub access_token: String,
}

fn default_tile_url() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            access_token: String::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Defaults plus environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("fitlog").join("config.toml")),
            Some(PathBuf::from("/etc/fitlog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup (the process environment in practice)
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("FITLOG_DB_PATH") {
            self.storage.db_path = path;
        }

        if let Some(host) = var("FITLOG_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("FITLOG_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(required) = var("FITLOG_AUTH_REQUIRED").and_then(|v| v.parse().ok()) {
            self.auth.required = required;
        }
        if let Some(secret) = var("FITLOG_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(id) = var("FITLOG_GOOGLE_CLIENT_ID") {
            self.auth.google_client_id = id;
        }
        if let Some(secret) = var("FITLOG_GOOGLE_CLIENT_SECRET") {
            self.auth.google_client_secret = secret;
        }
        if let Some(url) = var("FITLOG_GOOGLE_REDIRECT_URL") {
            self.auth.google_redirect_url = url;
        }
        if let Some(url) = var("FITLOG_FRONTEND_URL") {
            self.auth.frontend_url = url;
        }
        if let Some(audience) = var("FITLOG_PHONE_AUDIENCE") {
            self.auth.phone_audience = audience;
        }

        if let Some(token) = var("FITLOG_MAP_TOKEN") {
            self.map.access_token = token;
        }

        if let Some(level) = var("FITLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FITLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Fitlog Configuration
#
# Environment variables override these settings:
# - FITLOG_DB_PATH
# - FITLOG_API_HOST
# - FITLOG_API_PORT
# - FITLOG_AUTH_REQUIRED
# - FITLOG_JWT_SECRET
# - FITLOG_GOOGLE_CLIENT_ID
# - FITLOG_GOOGLE_CLIENT_SECRET
# - FITLOG_GOOGLE_REDIRECT_URL
# - FITLOG_FRONTEND_URL
# - FITLOG_PHONE_AUDIENCE
# - FITLOG_MAP_TOKEN
# - FITLOG_LOG_LEVEL
# - FITLOG_LOG_FORMAT

[storage]
# SQLite database file
db_path = "~/.local/share/fitlog/fitlog.db"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

# Allowed CORS origins
cors_origins = ["http://localhost:8084", "http://127.0.0.1:8084"]

# Request timeout in seconds
request_timeout_secs = 30

[auth]
# Require a signed session cookie on /api routes.
# When false, every request acts as the first user.
required = true

# HMAC secret for session tokens. Change this in production.
jwt_secret = "default_secret_for_dev_only"

# Session lifetime in days
token_days = 7

# Google sign-in (console.cloud.google.com)
google_client_id = ""
google_client_secret = ""
google_redirect_url = "http://localhost:8080/api/auth/google/callback"

# Where to send the browser after sign-in and sign-out
frontend_url = "/"

# Project id phone sign-in tokens must be issued for (empty accepts any)
phone_audience = ""

[map]
# Tile server used behind run routes
tile_url = "https://tile.openstreetmap.org/{z}/{x}/{y}.png"
access_token = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/fitlog/fitlog.log"
"#
    .to_string()
}
