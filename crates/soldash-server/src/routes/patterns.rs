//! Pattern analysis routes.
//!
//! - GET /api/v1/patterns - Decile pattern over the last N records
//! - GET /api/v1/patterns/compare - Patterns for the 10/30/50 windows
//! - GET /api/v1/insights - Strategic insight plus shift analysis

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use soldash_analytics::classifier::{TimingLabel, range_description, timing_label_for};
use soldash_analytics::insight::{StrategicInsight, strategic_insight};
use soldash_analytics::stability::{ShiftAnalysis, analyze_shift, classify_patterns};
use soldash_analytics::suggested_timing;
use soldash_core::{BucketedPattern, PatternSet, StabilityVerdict};

use crate::error::ApiResult;
use crate::provider::{SNAPSHOT_RECORD_LIMIT, aggregate_pattern, aggregate_patterns};
use crate::routes::{check_range, parse_param};
use crate::state::AppState;

/// Default number of records analyzed.
pub const DEFAULT_PATTERN_COUNT: usize = 10;

/// Maximum number of records analyzed.
pub const MAX_PATTERN_COUNT: usize = 100;

/// Query parameters for GET /patterns and GET /insights.
#[derive(Debug, Default, Deserialize)]
pub struct CountParams {
    pub count: Option<String>,
}

impl CountParams {
    fn count(&self) -> ApiResult<usize> {
        let count = parse_param("count", self.count.as_deref(), DEFAULT_PATTERN_COUNT)?;
        check_range("count", count, 1, MAX_PATTERN_COUNT)
    }
}

/// Response for GET /patterns.
#[derive(Debug, Serialize)]
pub struct PatternResponse {
    /// Records requested.
    pub requested: usize,
    #[serde(flatten)]
    pub pattern: BucketedPattern,
    pub hottest_range: &'static str,
    pub coldest_range: &'static str,
    pub suggested_timing: u8,
    pub timing: TimingLabel,
}

/// Response for GET /patterns/compare.
#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub patterns: PatternSet,
    pub stability: StabilityVerdict,
}

/// Response for GET /insights.
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub pattern_insights: StrategicInsight,
    pub shift_analysis: ShiftAnalysis,
}

async fn current_patterns(state: &AppState) -> PatternSet {
    aggregate_patterns(&state.store().recent(SNAPSHOT_RECORD_LIMIT).await)
}

/// GET /patterns - Pattern over the last `count` records (1-100).
async fn get_pattern(
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> ApiResult<Json<PatternResponse>> {
    let count = params.count()?;
    let pattern = aggregate_pattern(&state.store().recent(count).await, count);

    Ok(Json(PatternResponse {
        requested: count,
        hottest_range: range_description(pattern.hottest_bucket),
        coldest_range: range_description(pattern.coldest_bucket),
        suggested_timing: suggested_timing(pattern.hottest_bucket),
        timing: timing_label_for(pattern.hottest_bucket),
        pattern,
    }))
}

/// GET /patterns/compare - Patterns across the three fixed windows.
async fn compare_patterns(State(state): State<AppState>) -> ApiResult<Json<CompareResponse>> {
    let patterns = current_patterns(&state).await;
    let stability = classify_patterns(&patterns)?;
    Ok(Json(CompareResponse {
        patterns,
        stability,
    }))
}

/// GET /insights - Hot/cold zones for `count` records and the shift analysis.
async fn get_insights(
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> ApiResult<Json<InsightsResponse>> {
    let count = params.count()?;
    let pattern = aggregate_pattern(&state.store().recent(count).await, count);
    let shift_analysis = analyze_shift(&current_patterns(&state).await)?;

    Ok(Json(InsightsResponse {
        pattern_insights: strategic_insight(&pattern, count),
        shift_analysis,
    }))
}

/// Build pattern routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/patterns", get(get_pattern))
        .route("/patterns/compare", get(compare_patterns))
        .route("/insights", get(get_insights))
}
