//! Analytics Routes
//!
//! - GET /api/analytics/daily?start=YYYY-MM-DD&end=YYYY-MM-DD
//!
//! Returns one summary per calendar day in the range, newest first.
//! Without a range the last 30 days (ending today) are returned.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;

use fitlog_core::models::DailySummary;

use crate::api::dto::DailyRangeQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::session::AuthUser;
use crate::api::state::AppState;

/// Days covered when no range is given
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Resolve the requested range against `today`
pub fn resolve_range(query: &DailyRangeQuery, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = query.end.unwrap_or(today);
    let start = query
        .start
        .unwrap_or_else(|| end - Duration::days(DEFAULT_RANGE_DAYS - 1));
    (start, end)
}

pub async fn daily(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<DailyRangeQuery>,
) -> ApiResult<Json<Vec<DailySummary>>> {
    let (start, end) = resolve_range(&query, Utc::now().date_naive());
    if start > end {
        return Err(ApiError::Validation(format!(
            "start {start} is after end {end}"
        )));
    }
    Ok(Json(
        state
            .db(move |s| s.daily_summaries(auth.user_id, start, end))
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_range_is_thirty_days() {
        let (start, end) = resolve_range(&DailyRangeQuery::default(), d("2024-03-30"));
        assert_eq!(end, d("2024-03-30"));
        assert_eq!(start, d("2024-03-01"));
    }

    #[test]
    fn test_start_defaults_relative_to_end() {
        let query = DailyRangeQuery { start: None, end: Some(d("2024-02-10")) };
        let (start, _) = resolve_range(&query, d("2024-03-30"));
        assert_eq!(start, d("2024-01-12"));
    }
}
