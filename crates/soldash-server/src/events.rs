//! Event broadcasting for real-time notifications.
//!
//! Every notification appended to the dashboard log is also published on a
//! single `tokio::sync::broadcast` channel, which the SSE endpoint streams
//! to connected clients.
//!
//! # Event Types
//!
//! - `notification`: A notification was appended by a refresh
//! - `heartbeat`: Sent periodically to keep connections alive
//! - `catchup`: Sent when a subscriber falls behind

use chrono::{DateTime, Utc};
use serde::Serialize;
use soldash_core::NotificationEvent;
use tokio::sync::broadcast;

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Heartbeat interval in seconds.
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Event Types
// ============================================================================

/// An event that can be broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A notification was appended to the log.
    Notification(NotificationPayload),
    /// Periodic heartbeat to keep connection alive.
    Heartbeat(HeartbeatEvent),
    /// Client fell behind and should re-read the notification log.
    Catchup(CatchupEvent),
}

impl DashboardEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Notification(_) => "notification",
            Self::Heartbeat(_) => "heartbeat",
            Self::Catchup(_) => "catchup",
        }
    }
}

/// A notification together with the refresh that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    /// Sequence number of the producing refresh (0 for untracked updates).
    pub sequence: u64,
    /// The notification.
    #[serde(flatten)]
    pub event: NotificationEvent,
}

/// Heartbeat event data.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatEvent {
    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Catchup event sent when subscriber falls behind.
#[derive(Debug, Clone, Serialize)]
pub struct CatchupEvent {
    /// Number of events missed.
    pub events_missed: u64,
    /// Last refresh sequence the subscriber saw.
    pub last_sequence: u64,
    /// Timestamp of the catchup event.
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Publishes dashboard events to all subscribers.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<DashboardEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    /// Create a new event broadcaster with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new event broadcaster with custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        match self.sender.send(event) {
            Ok(count) => {
                tracing::trace!(receivers = count, "Published event to subscribers");
                count
            }
            Err(_) => {
                tracing::trace!("No subscribers for event");
                0
            }
        }
    }

    /// Publish notifications produced by one refresh, in emission order.
    pub fn publish_notifications(&self, sequence: u64, events: &[NotificationEvent]) -> usize {
        events
            .iter()
            .map(|event| {
                self.publish(DashboardEvent::Notification(NotificationPayload {
                    sequence,
                    event: event.clone(),
                }))
            })
            .sum()
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use soldash_core::NotificationKind;

    #[tokio::test]
    async fn test_broadcaster_subscribe() {
        let broadcaster = EventBroadcaster::new();
        let _r1 = broadcaster.subscribe();
        let _r2 = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_broadcaster_publish_in_order() {
        let broadcaster = EventBroadcaster::new();
        let mut receiver = broadcaster.subscribe();

        let events = vec![
            NotificationEvent::new(NotificationKind::Info, "first"),
            NotificationEvent::new(NotificationKind::Error, "second"),
        ];
        assert_eq!(broadcaster.publish_notifications(4, &events), 2);

        for expected in ["first", "second"] {
            match receiver.recv().await.unwrap() {
                DashboardEvent::Notification(payload) => {
                    assert_eq!(payload.sequence, 4);
                    assert_eq!(payload.event.message, expected);
                }
                other => panic!("Expected Notification event, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_broadcaster_publish_without_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let count = broadcaster.publish(DashboardEvent::Heartbeat(HeartbeatEvent {
            timestamp: Utc::now(),
        }));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_notification_serialization() {
        let event = DashboardEvent::Notification(NotificationPayload {
            sequence: 42,
            event: NotificationEvent::new(NotificationKind::Success, "Pattern stabilized"),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"notification\""));
        assert!(json.contains("\"kind\":\"success\""));
        assert!(json.contains("\"sequence\":42"));
        assert_eq!(event.name(), "notification");
    }

    #[tokio::test]
    async fn test_catchup_event_serialization() {
        let event = DashboardEvent::Catchup(CatchupEvent {
            events_missed: 100,
            last_sequence: 150,
            timestamp: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"catchup\""));
        assert!(json.contains("\"events_missed\":100"));
    }
}
