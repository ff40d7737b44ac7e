//! Aggregation routes.
//!
//! - GET /api/v1/leaderboard - Per-actor totals over a window
//! - GET /api/v1/histogram - Fixed-width bins over a record key
//! - GET /api/v1/dispersion - Spread of a window's decile percentages

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use soldash_analytics::aggregation::top_leaderboard;
use soldash_analytics::query::windowed;
use soldash_analytics::{AnalyticsError, DispersionMetrics, Histogram, bin_by_range, dispersion_metrics};
use soldash_core::{LeaderboardEntry, PatternWindow, Record, WindowSelection};

use crate::error::ApiResult;
use crate::provider::aggregate_pattern;
use crate::routes::{check_range, parse_param};
use crate::state::AppState;

/// Default number of leaderboard entries.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Default number of histogram bins.
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Record key a histogram is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramKey {
    /// Pot size.
    #[default]
    Value,
    /// Position percentile.
    Percentile,
    /// Winning ticket number.
    WinningKey,
}

impl HistogramKey {
    fn extract(self, record: &Record) -> f64 {
        match self {
            Self::Value => record.value,
            Self::Percentile => record.position_percentile,
            Self::WinningKey => record.winning_key as f64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub window: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistogramParams {
    #[serde(default)]
    pub key: HistogramKey,
    pub bins: Option<String>,
    pub window: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DispersionParams {
    pub window: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistogramResponse {
    pub key: HistogramKey,
    #[serde(flatten)]
    pub histogram: Histogram,
}

#[derive(Debug, Serialize)]
pub struct DispersionResponse {
    pub window: PatternWindow,
    #[serde(flatten)]
    pub metrics: DispersionMetrics,
}

async fn windowed_records(state: &AppState, raw: Option<&str>) -> ApiResult<Vec<Record>> {
    let window = parse_param("window", raw, WindowSelection::All)?;
    Ok(windowed(&state.store().all().await, window))
}

/// GET /leaderboard - Top actors by total value.
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Json<Vec<LeaderboardEntry>>> {
    let limit = parse_param("limit", params.limit.as_deref(), DEFAULT_LEADERBOARD_LIMIT)?;
    let limit = check_range("limit", limit, 1, 100)?;
    let records = windowed_records(&state, params.window.as_deref()).await?;
    Ok(Json(top_leaderboard(&records, limit)))
}

/// GET /histogram - Binned distribution of a record key.
///
/// An empty window yields an empty histogram rather than an error.
async fn get_histogram(
    State(state): State<AppState>,
    Query(params): Query<HistogramParams>,
) -> ApiResult<Json<HistogramResponse>> {
    let bins = parse_param("bins", params.bins.as_deref(), DEFAULT_BIN_COUNT)?;
    let bins = check_range("bins", bins, 1, 100)?;
    let records = windowed_records(&state, params.window.as_deref()).await?;

    let key = params.key;
    Ok(Json(HistogramResponse {
        key,
        histogram: bin_by_range(&records, |r| key.extract(r), bins),
    }))
}

/// GET /dispersion - Dispersion of one pattern window.
async fn get_dispersion(
    State(state): State<AppState>,
    Query(params): Query<DispersionParams>,
) -> ApiResult<Json<DispersionResponse>> {
    let window = parse_param(
        "window",
        params.window.as_deref(),
        state.config().default_window,
    )?;

    let records = state.store().recent(window.size()).await;
    if records.is_empty() {
        return Err(AnalyticsError::EmptyRecordSet.into());
    }

    let pattern = aggregate_pattern(&records, window.size());
    let metrics = dispersion_metrics(&pattern.percentages).ok_or(AnalyticsError::EmptyRecordSet)?;
    Ok(Json(DispersionResponse { window, metrics }))
}

/// Build aggregation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/histogram", get(get_histogram))
        .route("/dispersion", get(get_dispersion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::routes::test_support::{records, send, state};

    #[tokio::test]
    async fn test_leaderboard() {
        let state = state();
        // values equal ids: alice 1+4=5, bob 2+5=7, carol 3+6=9
        state.store().insert_records(records(&[5.0; 6])).await;

        let (status, json) = send(&state, "GET", "/api/v1/leaderboard?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let board = json.as_array().unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0]["actor"], "carol");
        assert_eq!(board[0]["total_value"], 9.0);
        assert_eq!(board[1]["actor"], "bob");

        // window of the 2 most recent: ids 5 (bob) and 6 (carol)
        let (_, json) = send(&state, "GET", "/api/v1/leaderboard?window=2", None).await;
        assert_eq!(json[0]["actor"], "carol");
        assert_eq!(json[0]["count"], 1);
    }

    #[tokio::test]
    async fn test_histogram() {
        let state = state();
        state
            .store()
            .insert_records(records(&[5.0, 15.0, 95.0]))
            .await;

        let (status, json) = send(
            &state,
            "GET",
            "/api/v1/histogram?key=percentile&bins=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["key"], "percentile");
        assert_eq!(json["counts"], serde_json::json!([2, 1]));

        let (status, _) = send(&state, "GET", "/api/v1/histogram?key=height", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_histogram_empty() {
        let state = state();
        let (status, json) = send(&state, "GET", "/api/v1/histogram", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["labels"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_dispersion() {
        let state = state();
        let (status, json) = send(&state, "GET", "/api/v1/dispersion", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "EMPTY_RECORD_SET");

        state.store().insert_records(records(&[55.0; 10])).await;
        let (status, json) = send(&state, "GET", "/api/v1/dispersion?window=10", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["window"], 10);
        assert_eq!(json["mean"], 10.0);
        assert_eq!(json["consistency_score"], 0.0);

        let (status, _) = send(&state, "GET", "/api/v1/dispersion?window=20", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_histogram_key_extract() {
        let record = Record::new(1, 2.5, 42, "a", 33.0);
        assert_eq!(HistogramKey::Value.extract(&record), 2.5);
        assert_eq!(HistogramKey::Percentile.extract(&record), 33.0);
        assert_eq!(HistogramKey::WinningKey.extract(&record), 42.0);
    }
}
