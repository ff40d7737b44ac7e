//! Refresh and notification routes.
//!
//! - POST /api/v1/refresh - Run one refresh through the pipeline
//! - GET /api/v1/notifications - The notification log, newest first
//! - POST /api/v1/notifications/read - Mark one or all notifications read
//! - GET /api/v1/notifications/stream - SSE stream of new notifications
//!
//! # Event Format
//!
//! ```text
//! event: notification
//! data: {"type":"notification","sequence":4,"id":"...","message":"Hot decile shifted: 6 → 2","kind":"info",...}
//!
//! event: heartbeat
//! data: {"type":"heartbeat","timestamp":"..."}
//! ```

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
};
use chrono::Utc;
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use soldash_analytics::MonitoredMetrics;
use soldash_core::NotificationEvent;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::events::{CatchupEvent, DashboardEvent, HEARTBEAT_INTERVAL_SECS, HeartbeatEvent};
use crate::refresh::{RefreshReport, run_refresh};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for GET /notifications.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationEvent>,
    pub unread_count: usize,
    pub refreshing: bool,
    pub metrics: Option<MonitoredMetrics>,
}

/// Query parameters for POST /notifications/read.
#[derive(Debug, Default, Deserialize)]
pub struct MarkReadParams {
    /// Mark only this notification; all when absent.
    pub id: Option<Uuid>,
}

/// Response for POST /notifications/read.
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub unread_count: usize,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /refresh - Fetch from the provider and run the notifier.
async fn refresh(State(state): State<AppState>) -> ApiResult<Json<RefreshReport>> {
    Ok(Json(run_refresh(&state).await?))
}

/// GET /notifications - Current log.
async fn list_notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    let dashboard = state.dashboard().lock().await;
    Json(NotificationsResponse {
        notifications: dashboard.log().to_vec(),
        unread_count: dashboard.unread_count(),
        refreshing: dashboard.is_refreshing(),
        metrics: dashboard.current_metrics().copied(),
    })
}

/// POST /notifications/read - Mark notifications read.
///
/// # Response
///
/// - 200 OK: remaining unread count
/// - 404 Not Found: `id` is not in the log
async fn mark_read(
    State(state): State<AppState>,
    Query(params): Query<MarkReadParams>,
) -> ApiResult<Json<MarkReadResponse>> {
    let mut dashboard = state.dashboard().lock().await;
    match params.id {
        Some(id) => {
            if !dashboard.mark_read(id) {
                return Err(ApiError::NotFound(format!("Notification {} not found", id)));
            }
        }
        None => dashboard.mark_all_read(),
    }

    Ok(Json(MarkReadResponse {
        unread_count: dashboard.unread_count(),
    }))
}

fn to_sse(event: &DashboardEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.name()).data(data)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            None
        }
    }
}

/// GET /notifications/stream - Subscribe to new notifications.
///
/// # Backpressure
///
/// A client that falls behind receives a `catchup` event with the number of
/// missed events and should re-read GET /notifications.
async fn stream_notifications(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.broadcaster().subscribe();
    tracing::info!("Client subscribed to notification stream");

    let stream = stream::unfold(
        (receiver, 0u64),
        |(mut rx, mut last_sequence)| async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => {
                        if let DashboardEvent::Notification(ref payload) = event {
                            last_sequence = payload.sequence;
                        }
                        event
                    }
                    Err(RecvError::Lagged(count)) => {
                        tracing::warn!(
                            events_missed = count,
                            "SSE client lagged, sending catchup event"
                        );
                        DashboardEvent::Catchup(CatchupEvent {
                            events_missed: count,
                            last_sequence,
                            timestamp: Utc::now(),
                        })
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Event channel closed, ending SSE stream");
                        return None;
                    }
                };

                if let Some(sse_event) = to_sse(&event) {
                    return Some((Ok(sse_event), (rx, last_sequence)));
                }
            }
        },
    );

    let heartbeat = DashboardEvent::Heartbeat(HeartbeatEvent {
        timestamp: Utc::now(),
    });
    let keep_alive = KeepAlive::new()
        .interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS))
        .event(to_sse(&heartbeat).unwrap_or_else(|| Event::default().event("heartbeat")));

    Sse::new(stream).keep_alive(keep_alive)
}

/// Build notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/refresh", post(refresh))
        .route("/notifications", get(list_notifications))
        .route("/notifications/read", post(mark_read))
        .route("/notifications/stream", get(stream_notifications))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{records, send, state};

    #[tokio::test]
    async fn test_refresh_on_empty_store_uses_fallback() {
        let state = state();
        let (status, json) = send(&state, "POST", "/api/v1/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["applied"], true);
        assert_eq!(json["using_fallback_data"], true);
        assert!(json["advisory"].is_string());
        assert_eq!(json["events"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_refresh_then_shift_notifies() {
        let state = state();
        state.store().insert_records(records(&[55.0; 10])).await;

        let (_, json) = send(&state, "POST", "/api/v1/refresh", None).await;
        assert_eq!(json["stability"], "stable");
        assert_eq!(json["events"], serde_json::json!([]));

        // ten newer records in decile 2 take over the last-10 window
        let newer: Vec<_> = records(&[15.0; 20]).into_iter().skip(10).collect();
        state.store().insert_records(newer).await;

        let (_, json) = send(&state, "POST", "/api/v1/refresh", None).await;
        let messages: Vec<&str> = json["events"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["message"].as_str().unwrap())
            .collect();
        assert_eq!(messages.iter().filter(|m| m.contains("6 → 2")).count(), 1);

        let (_, json) = send(&state, "GET", "/api/v1/notifications", None).await;
        let unread = json["unread_count"].as_u64().unwrap();
        assert!(unread >= 1);
        let first_id = json["notifications"][0]["id"].as_str().unwrap().to_string();

        let uri = format!("/api/v1/notifications/read?id={}", first_id);
        let (status, json) = send(&state, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["unread_count"].as_u64().unwrap(), unread - 1);

        let (_, json) = send(&state, "POST", "/api/v1/notifications/read", None).await;
        assert_eq!(json["unread_count"], 0);
    }

    #[tokio::test]
    async fn test_mark_unknown_notification() {
        let state = state();
        let uri = format!("/api/v1/notifications/read?id={}", uuid::Uuid::nil());
        let (status, _) = send(&state, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
