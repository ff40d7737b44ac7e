//! Liveness plus a glance at the dashboard: what is stored and whether a
//! refresh is outstanding.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub total_games: usize,
    pub newest_game_id: Option<i64>,
    pub refreshing: bool,
    pub latest_sequence: u64,
    pub stream_subscribers: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.store().stats().await;
    let (refreshing, latest_sequence) = {
        let dashboard = state.dashboard().lock().await;
        (dashboard.is_refreshing(), dashboard.latest_sequence())
    };

    Json(HealthResponse {
        status: "ok",
        total_games: stats.total_records,
        newest_game_id: stats.newest_id,
        refreshing,
        latest_sequence,
        stream_subscribers: state.broadcaster().subscriber_count(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
