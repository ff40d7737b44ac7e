//! Live game state pushed by the browser extension.
//!
//! The payload is opaque and kept in memory only. Reads older than
//! [`LIVE_GAME_MAX_AGE_SECS`] report the data as unavailable.

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{AppState, LiveGame};

/// Age after which live data is considered stale.
pub const LIVE_GAME_MAX_AGE_SECS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct LiveGameResponse {
    pub available: bool,
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct LiveGameUpdated {
    pub success: bool,
    pub message: String,
}

fn describe(live: Option<&LiveGame>, now: DateTime<Utc>) -> LiveGameResponse {
    let Some(live) = live else {
        return LiveGameResponse {
            available: false,
            data: None,
            message: Some("No live game data available".to_string()),
            last_updated: None,
        };
    };

    let age = (now - live.last_updated).num_seconds();
    if age > LIVE_GAME_MAX_AGE_SECS {
        return LiveGameResponse {
            available: false,
            data: None,
            message: Some(format!("Live data is stale ({}s old)", age)),
            last_updated: Some(live.last_updated),
        };
    }

    LiveGameResponse {
        available: true,
        data: Some(live.data.clone()),
        message: None,
        last_updated: Some(live.last_updated),
    }
}

/// GET /live-game - Current live game, if fresh.
async fn get_live_game(State(state): State<AppState>) -> Json<LiveGameResponse> {
    let live = state.live_game().read().await;
    Json(describe(live.as_ref(), Utc::now()))
}

/// POST /live-game - Replace the live game state.
async fn update_live_game(
    State(state): State<AppState>,
    Json(data): Json<serde_json::Value>,
) -> Json<LiveGameUpdated> {
    tracing::debug!(pot_value = ?data.get("pot_value"), "Live game updated");
    *state.live_game().write().await = Some(LiveGame {
        data,
        last_updated: Utc::now(),
    });

    Json(LiveGameUpdated {
        success: true,
        message: "Live game state updated".to_string(),
    })
}

/// Build live game routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/live-game", get(get_live_game).post(update_live_game))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    use crate::routes::test_support::{send, state};

    #[test]
    fn test_describe_stale() {
        let now = Utc::now();
        let live = LiveGame {
            data: json!({ "pot_value": 3.2 }),
            last_updated: now - Duration::seconds(31),
        };
        let response = describe(Some(&live), now);
        assert!(!response.available);
        assert_eq!(response.message.as_deref(), Some("Live data is stale (31s old)"));

        let fresh = LiveGame {
            last_updated: now - Duration::seconds(30),
            ..live
        };
        assert!(describe(Some(&fresh), now).available);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let state = state();
        let (_, json) = send(&state, "GET", "/api/v1/live-game", None).await;
        assert_eq!(json["available"], false);

        let (status, _) = send(
            &state,
            "POST",
            "/api/v1/live-game",
            Some(json!({ "pot_value": 1.25, "players": 4 })),
        )
        .await;
        assert_eq!(status, axum::http::StatusCode::OK);

        let (_, json) = send(&state, "GET", "/api/v1/live-game", None).await;
        assert_eq!(json["available"], true);
        assert_eq!(json["data"]["players"], 4);
    }
}
