//! Refresh orchestration: provider fetch around the dashboard pipeline.
//!
//! The dashboard lock is held only to issue a ticket and to apply the
//! response, never across the provider call, so a slow provider cannot block
//! reads of the notification log. Overlapping refreshes are resolved by the
//! ticket sequence: the older response is reported as not applied.

use serde::Serialize;
use soldash_analytics::{AnalyticsError, MonitoredMetrics, RefreshOutcome, RefreshSnapshot};
use soldash_core::{NotificationEvent, StabilityVerdict};

use crate::error::ApiResult;
use crate::provider::{ProviderError, ProviderSnapshot, fallback_patterns};
use crate::state::AppState;

/// Result of one refresh as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    /// Ticket sequence of this refresh.
    pub sequence: u64,
    /// False if a newer refresh superseded this one.
    pub applied: bool,
    /// Placeholder patterns were used.
    pub using_fallback_data: bool,
    /// Why placeholder data is shown, if it is.
    pub advisory: Option<String>,
    /// Metrics derived by this refresh.
    pub metrics: Option<MonitoredMetrics>,
    /// Stability verdict derived by this refresh.
    pub stability: Option<StabilityVerdict>,
    /// Notifications emitted by this refresh.
    pub events: Vec<NotificationEvent>,
    /// Unread notifications after this refresh.
    pub unread_count: usize,
}

async fn fetch_with_timeout(state: &AppState) -> Result<ProviderSnapshot, ProviderError> {
    let timeout = state.config().provider_timeout();
    match tokio::time::timeout(timeout, state.provider().fetch()).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(state.config().provider_timeout_secs)),
    }
}

/// Runs one tracked refresh.
pub async fn run_refresh(state: &AppState) -> ApiResult<RefreshReport> {
    let ticket = state.dashboard().lock().await.begin_refresh();
    let sequence = ticket.sequence();
    tracing::debug!(sequence, "Refresh started");

    let (snapshot, advisory) = match fetch_with_timeout(state).await {
        Ok(fetched) => (RefreshSnapshot::live(fetched.patterns), None),
        Err(e) => {
            tracing::warn!(sequence, error = %e, "Provider unavailable, using placeholder patterns");
            (RefreshSnapshot::fallback(fallback_patterns()), Some(e.advisory()))
        }
    };
    let using_fallback_data = snapshot.using_fallback_data;

    let mut dashboard = state.dashboard().lock().await;
    match dashboard.complete_refresh(ticket, snapshot) {
        Ok(outcome) => {
            publish(state, &outcome);
            Ok(RefreshReport {
                sequence,
                applied: true,
                using_fallback_data,
                advisory,
                stability: outcome.metrics.map(|m| m.stability),
                metrics: outcome.metrics,
                events: outcome.events,
                unread_count: dashboard.unread_count(),
            })
        }
        Err(AnalyticsError::StaleResponse { latest, .. }) => {
            tracing::info!(sequence, latest, "Refresh superseded by a newer one");
            Ok(RefreshReport {
                sequence,
                applied: false,
                using_fallback_data,
                advisory,
                metrics: None,
                stability: None,
                events: Vec::new(),
                unread_count: dashboard.unread_count(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Applies an observed update after new records were imported.
///
/// The update supersedes any refresh still waiting on the provider.
///
/// Provider failures are ignored here; the next tracked refresh reports them.
pub async fn observe_store(state: &AppState) -> Option<RefreshOutcome> {
    let fetched = match fetch_with_timeout(state).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping post-import update");
            return None;
        }
    };

    let mut dashboard = state.dashboard().lock().await;
    match dashboard.observe(RefreshSnapshot::live(fetched.patterns)) {
        Ok(outcome) => {
            publish(state, &outcome);
            Some(outcome)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Post-import update rejected");
            None
        }
    }
}

fn publish(state: &AppState, outcome: &RefreshOutcome) {
    if outcome.events.is_empty() {
        return;
    }
    let receivers = state
        .broadcaster()
        .publish_notifications(outcome.sequence, &outcome.events);
    tracing::debug!(
        sequence = outcome.sequence,
        events = outcome.events.len(),
        receivers,
        "Published notifications"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::BoxFuture;
    use soldash_core::{NotificationKind, Record};
    use tokio::sync::Mutex;

    use crate::config::ServerConfig;
    use crate::provider::{DataProvider, aggregate_patterns};
    use crate::store::RecordStore;

    /// Provider answering from a queue of (delay, percentile batch) scripts.
    struct ScriptedProvider {
        script: Mutex<VecDeque<(Duration, Vec<f64>)>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<(Duration, Vec<f64>)>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl DataProvider for ScriptedProvider {
        fn fetch(&self) -> BoxFuture<'_, Result<ProviderSnapshot, ProviderError>> {
            Box::pin(async move {
                let next = self.script.lock().await.pop_front();
                let Some((delay, percentiles)) = next else {
                    return Err(ProviderError::Transport("script exhausted".to_string()));
                };
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let records: Vec<Record> = percentiles
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| Record::new(1000 - i as i64, 1.0, 1, "alice", p))
                    .collect();
                Ok(ProviderSnapshot {
                    patterns: aggregate_patterns(&records),
                    total_count: records.len(),
                    records,
                })
            })
        }
    }

    /// Hot decile `decile` in every window.
    fn uniform(decile: u8) -> Vec<f64> {
        vec![f64::from(decile) * 10.0 - 5.0; 50]
    }

    fn state_with(provider: impl DataProvider + 'static, timeout_secs: u64) -> AppState {
        let config = ServerConfig {
            provider_timeout_secs: timeout_secs,
            ..ServerConfig::default()
        };
        AppState::with_provider(config, Arc::new(RecordStore::new()), Arc::new(provider))
    }

    #[tokio::test]
    async fn test_refresh_emits_on_change() {
        let state = state_with(
            ScriptedProvider::new(vec![
                (Duration::ZERO, uniform(6)),
                (Duration::ZERO, uniform(2)),
            ]),
            5,
        );
        let mut rx = state.broadcaster().subscribe();

        let first = tokio_test::assert_ok!(run_refresh(&state).await);
        assert!(first.applied);
        assert!(first.events.is_empty());
        assert_eq!(first.stability, Some(StabilityVerdict::Stable));

        let second = tokio_test::assert_ok!(run_refresh(&state).await);
        assert_eq!(second.events.len(), 2);
        assert!(second.events[0].message.contains("6 → 2"));
        assert!(second.events[1].message.contains("55% → 15%"));
        assert_eq!(second.unread_count, 2);

        let published = rx.recv().await.unwrap();
        assert_eq!(published.name(), "notification");
    }

    #[tokio::test]
    async fn test_provider_failure_uses_fallback_without_events() {
        let state = state_with(
            ScriptedProvider::new(vec![(Duration::ZERO, uniform(6))]),
            5,
        );
        run_refresh(&state).await.unwrap();

        // script exhausted: transport failure
        let report = run_refresh(&state).await.unwrap();
        assert!(report.applied);
        assert!(report.using_fallback_data);
        assert!(report.advisory.is_some());
        assert!(report.events.is_empty());

        let dashboard = state.dashboard().lock().await;
        assert_eq!(
            dashboard.notifier_state().prev_hot_bucket.map(|d| d.get()),
            Some(6)
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let state = state_with(
            ScriptedProvider::new(vec![(Duration::from_secs(5), uniform(6))]),
            1,
        );
        let report = run_refresh(&state).await.unwrap();
        assert!(report.using_fallback_data);
        assert!(report.advisory.unwrap().contains("1s"));
    }

    #[tokio::test]
    async fn test_slow_response_is_not_applied() {
        let state = state_with(
            ScriptedProvider::new(vec![
                (Duration::ZERO, uniform(6)),
                (Duration::from_millis(200), uniform(9)),
                (Duration::ZERO, uniform(3)),
            ]),
            5,
        );
        run_refresh(&state).await.unwrap();

        let (slow, fast) = tokio::join!(run_refresh(&state), run_refresh(&state));
        let slow = slow.unwrap();
        let fast = fast.unwrap();

        assert!(fast.applied);
        assert!(!slow.applied);
        assert!(slow.sequence < fast.sequence);

        let dashboard = state.dashboard().lock().await;
        assert_eq!(dashboard.current_metrics().unwrap().hot_bucket.get(), 3);
        assert!(
            dashboard
                .log()
                .iter()
                .all(|e| !e.message.contains("→ 9"))
        );
    }

    #[tokio::test]
    async fn test_observe_store_emits_and_advances_sequence() {
        let state = state_with(
            ScriptedProvider::new(vec![
                (Duration::ZERO, uniform(6)),
                (Duration::ZERO, {
                    let mut p = uniform(6);
                    p[..25].fill(15.0);
                    p
                }),
            ]),
            5,
        );
        assert!(observe_store(&state).await.unwrap().events.is_empty());

        // every window now hot at 2; the 25/25 tie over 50 goes to the lower decile
        let outcome = observe_store(&state).await.unwrap();
        assert_eq!(outcome.sequence, 2);
        assert!(
            outcome
                .events
                .iter()
                .any(|e| e.kind == NotificationKind::Info && e.message.contains("6 → 2"))
        );
    }
}
