//! Data Transfer Objects
//!
//! Response and query types owned by the API layer. Resource bodies are
//! the shared `fitlog_core::models` types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::storage::StoreStats;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// "ok" or "error"
    pub database: String,
    pub uptime_seconds: u64,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StoreStats>,
}

/// `GET /analytics/daily` query string
#[derive(Debug, Default, Deserialize)]
pub struct DailyRangeQuery {
    /// First day, `YYYY-MM-DD`
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last day, `YYYY-MM-DD`
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// Google redirect query string
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
