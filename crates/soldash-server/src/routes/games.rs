//! Record ingestion and browsing routes.
//!
//! - POST /api/v1/import - Import records, skipping duplicates
//! - GET /api/v1/games - Most recent records
//! - GET /api/v1/stats - Store statistics
//! - GET /api/v1/records - Windowed, filtered, sorted, paginated records

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use soldash_analytics::classifier::{TimingLabel, timing_label_for};
use soldash_analytics::query::{self, BucketFilter, QueryState, SortMode};
use soldash_core::{Record, WindowSelection};

use crate::error::{ApiError, ApiResult};
use crate::refresh::observe_store;
use crate::routes::{check_range, parse_param};
use crate::state::AppState;
use crate::store::StoreStats;

/// Default number of records returned by GET /games.
pub const DEFAULT_GAMES_LIMIT: usize = 50;

/// Maximum number of records returned by GET /games.
pub const MAX_GAMES_LIMIT: usize = 1000;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /import.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Records to import.
    pub games: Vec<Record>,
}

/// Response for POST /import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub total_games: usize,
    pub newly_inserted: usize,
    pub duplicates_skipped: usize,
    pub message: String,
}

/// Query parameters for GET /games.
#[derive(Debug, Default, Deserialize)]
pub struct GamesParams {
    pub limit: Option<String>,
}

/// Response for GET /stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub database: StoreStats,
    pub api_version: &'static str,
    pub status: &'static str,
}

/// Query parameters for GET /records.
#[derive(Debug, Default, Deserialize)]
pub struct RecordsParams {
    pub window: Option<String>,
    pub search: Option<String>,
    pub bucket: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

impl RecordsParams {
    fn to_state(&self) -> ApiResult<QueryState> {
        Ok(QueryState {
            window: parse_param("window", self.window.as_deref(), WindowSelection::All)?,
            search_term: self.search.clone().unwrap_or_default(),
            bucket_filter: parse_param("bucket", self.bucket.as_deref(), BucketFilter::All)?,
            sort_mode: parse_param("sort", self.sort.as_deref(), SortMode::Recent)?,
            page: parse_param("page", self.page.as_deref(), 1)?,
        })
    }
}

/// A record with its timing label.
#[derive(Debug, Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: Record,
    pub timing: TimingLabel,
}

impl From<Record> for RecordView {
    fn from(record: Record) -> Self {
        Self {
            timing: timing_label_for(record.bucket),
            record,
        }
    }
}

/// Response for GET /records.
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub items: Vec<RecordView>,
    pub total_count: usize,
    pub total_pages: usize,
    pub page: usize,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /import - Import records.
///
/// # Response
///
/// - 200 OK: insertion statistics
/// - 400 Bad Request: empty record list
async fn import_games(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    if request.games.is_empty() {
        return Err(ApiError::BadRequest("No games provided".to_string()));
    }

    tracing::info!(submitted = request.games.len(), "Importing games");
    let summary = state.store().insert_records(request.games).await;

    if summary.inserted > 0 {
        observe_store(&state).await;
    }

    Ok(Json(ImportResponse {
        success: true,
        total_games: summary.total,
        newly_inserted: summary.inserted,
        duplicates_skipped: summary.duplicates(),
        message: format!(
            "Successfully imported {} new games ({} duplicates skipped)",
            summary.inserted,
            summary.duplicates()
        ),
    }))
}

/// GET /games - Most recent records, highest id first.
async fn list_games(
    State(state): State<AppState>,
    Query(params): Query<GamesParams>,
) -> ApiResult<Json<Vec<Record>>> {
    let limit = parse_param("limit", params.limit.as_deref(), DEFAULT_GAMES_LIMIT)?;
    let limit = check_range("limit", limit, 1, MAX_GAMES_LIMIT)?;
    Ok(Json(state.store().recent(limit).await))
}

/// GET /stats - Store statistics.
async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        database: state.store().stats().await,
        api_version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// GET /records - One page of the query pipeline.
async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordsParams>,
) -> ApiResult<Json<RecordsResponse>> {
    let query_state = params.to_state()?;
    let records = state.store().all().await;
    let page = query::apply(&records, &query_state);

    Ok(Json(RecordsResponse {
        items: page.items.into_iter().map(RecordView::from).collect(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        page: page.page,
    }))
}

/// Build record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_games))
        .route("/games", get(list_games))
        .route("/stats", get(get_stats))
        .route("/records", get(list_records))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{records, send, state};

    #[tokio::test]
    async fn test_import_and_duplicates() {
        let state = state();
        let body = json!({ "games": records(&[5.0, 15.0, 25.0]) });

        let (status, json) = send(&state, "POST", "/api/v1/import", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["newly_inserted"], 3);

        let (_, json) = send(&state, "POST", "/api/v1/import", Some(body)).await;
        assert_eq!(json["newly_inserted"], 0);
        assert_eq!(json["duplicates_skipped"], 3);
    }

    #[tokio::test]
    async fn test_import_accepts_provider_field_names() {
        let state = state();
        let body = json!({ "games": [{
            "game_id": 77,
            "game_value": 1.5,
            "winning_ticket": 12,
            "winner": "degen",
            "ticket_percentile": 42.0,
            "decile": 5
        }]});

        let (status, _) = send(&state, "POST", "/api/v1/import", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.store().recent(1).await[0].actor, "degen");
    }

    #[tokio::test]
    async fn test_import_empty_rejected() {
        let state = state();
        let (status, json) =
            send(&state, "POST", "/api/v1/import", Some(json!({ "games": [] }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_games_limit() {
        let state = state();
        state
            .store()
            .insert_records(records(&[5.0, 15.0, 25.0]))
            .await;

        let (status, json) = send(&state, "GET", "/api/v1/games?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<i64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2]);

        let (status, _) = send(&state, "GET", "/api/v1/games?limit=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&state, "GET", "/api/v1/games?limit=1001", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_records_pipeline() {
        let state = state();
        let percentiles: Vec<f64> = (0..25).map(|i| f64::from(i % 10) * 10.0 + 5.0).collect();
        state.store().insert_records(records(&percentiles)).await;

        let (status, json) = send(
            &state,
            "GET",
            "/api/v1/records?window=20&search=ALI&sort=highest&page=9",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // ids 6..=25 that belong to alice (id % 3 == 1)
        assert_eq!(json["total_count"], 7);
        assert_eq!(json["total_pages"], 1);
        assert_eq!(json["page"], 1);
        assert_eq!(json["items"][0]["id"], 25);
        assert!(json["items"][0]["timing"].is_string());

        let (status, json) = send(&state, "GET", "/api/v1/records?bucket=3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 3);

        let (status, _) = send(&state, "GET", "/api/v1/records?bucket=11", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&state, "GET", "/api/v1/records?sort=random", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats() {
        let state = state();
        state.store().insert_records(records(&[5.0, 15.0])).await;
        let (_, json) = send(&state, "GET", "/api/v1/stats", None).await;
        assert_eq!(json["database"]["total_records"], 2);
        assert_eq!(json["database"]["newest_id"], 2);
        assert_eq!(json["status"], "operational");
    }
}
