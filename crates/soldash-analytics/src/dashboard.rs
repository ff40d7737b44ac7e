//! Refresh pipeline: patterns → metrics → diff → events → log.
//!
//! [`Dashboard`] owns the notifier state and the notification log and runs
//! the whole pipeline synchronously. The only asynchronous step (fetching
//! from the data provider) happens between [`Dashboard::begin_refresh`] and
//! [`Dashboard::complete_refresh`], outside of this type.
//!
//! Each refresh and each observed update is tagged with a monotonically
//! increasing sequence number. A response is applied only if its ticket is the latest one issued and
//! still outstanding; anything else is a [`AnalyticsError::StaleResponse`]
//! and leaves all state untouched, so a slow response can never overwrite a
//! newer one.

use serde::{Deserialize, Serialize};
use soldash_core::{NotificationEvent, PatternSet, PatternWindow};
use uuid::Uuid;

use crate::log::{DEFAULT_CAPACITY, NotificationLog};
use crate::notifier::{self, MonitoredMetrics, NotifierState, RefreshGate};
use crate::{AnalyticsError, AnalyticsResult};

/// Handle for one outstanding refresh.
///
/// Deliberately not `Clone`: a ticket completes at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    sequence: u64,
}

impl RefreshTicket {
    /// Sequence number of this refresh.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Provider data delivered to the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSnapshot {
    /// Per-window patterns, if the provider had any.
    pub patterns: Option<PatternSet>,
    /// The patterns are placeholders standing in for unavailable data.
    pub using_fallback_data: bool,
}

impl RefreshSnapshot {
    /// Snapshot backed by real provider data.
    pub fn live(patterns: PatternSet) -> Self {
        Self {
            patterns: Some(patterns),
            using_fallback_data: false,
        }
    }

    /// Snapshot backed by placeholder data.
    pub fn fallback(patterns: PatternSet) -> Self {
        Self {
            patterns: Some(patterns),
            using_fallback_data: true,
        }
    }
}

/// Result of applying a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Sequence number of the applied refresh or observed update.
    pub sequence: u64,
    /// Metrics derived from the snapshot, absent when it had no patterns.
    pub metrics: Option<MonitoredMetrics>,
    /// Notifications emitted by this refresh, in emission order.
    pub events: Vec<NotificationEvent>,
    /// Whether the snapshot was placeholder data.
    pub using_fallback_data: bool,
}

/// Stateful refresh coordinator.
#[derive(Debug, Clone)]
pub struct Dashboard {
    default_window: PatternWindow,
    notifier: NotifierState,
    log: NotificationLog,
    issued: u64,
    pending: Option<u64>,
    metrics: Option<MonitoredMetrics>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(PatternWindow::default(), DEFAULT_CAPACITY)
    }
}

impl Dashboard {
    /// Creates a dashboard watching `default_window` with a log of `capacity`.
    pub fn new(default_window: PatternWindow, capacity: usize) -> Self {
        Self {
            default_window,
            notifier: NotifierState::default(),
            log: NotificationLog::with_capacity(capacity),
            issued: 0,
            pending: None,
            metrics: None,
        }
    }

    /// Window whose hottest decile is monitored.
    pub fn default_window(&self) -> PatternWindow {
        self.default_window
    }

    /// Issues a new refresh, superseding any outstanding one.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        if let Some(previous) = self.pending.replace(self.issued) {
            tracing::debug!(
                superseded = previous,
                sequence = self.issued,
                "Refresh issued while another was outstanding"
            );
        }
        RefreshTicket {
            sequence: self.issued,
        }
    }

    /// True while the latest issued refresh has not completed or failed.
    pub fn is_refreshing(&self) -> bool {
        self.pending.is_some()
    }

    /// Latest sequence number issued.
    pub fn latest_sequence(&self) -> u64 {
        self.issued
    }

    /// Applies the provider response for `ticket`.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        snapshot: RefreshSnapshot,
    ) -> AnalyticsResult<RefreshOutcome> {
        if self.pending != Some(ticket.sequence) {
            tracing::warn!(
                sequence = ticket.sequence,
                latest = self.issued,
                "Discarding stale refresh response"
            );
            return Err(AnalyticsError::StaleResponse {
                sequence: ticket.sequence,
                latest: self.issued,
            });
        }
        self.pending = None;

        let gate = RefreshGate {
            using_fallback_data: snapshot.using_fallback_data,
            refresh_in_flight: false,
        };
        self.apply(ticket.sequence, snapshot, gate)
    }

    /// Marks the refresh for `ticket` as failed. Stale tickets are ignored.
    pub fn fail_refresh(&mut self, ticket: RefreshTicket) {
        if self.pending == Some(ticket.sequence) {
            self.pending = None;
        }
        tracing::debug!(sequence = ticket.sequence, "Refresh failed");
    }

    /// Applies an update that was not requested through a ticket, e.g. after
    /// new records were ingested.
    ///
    /// The update takes the next sequence number, so any outstanding refresh
    /// becomes stale. If one was outstanding, this update is displayed but
    /// does not drive notifications.
    pub fn observe(&mut self, snapshot: RefreshSnapshot) -> AnalyticsResult<RefreshOutcome> {
        let in_flight = self.pending.take();
        self.issued += 1;
        if let Some(superseded) = in_flight {
            tracing::debug!(
                superseded,
                sequence = self.issued,
                "Observed update superseded an outstanding refresh"
            );
        }

        let gate = RefreshGate {
            using_fallback_data: snapshot.using_fallback_data,
            refresh_in_flight: in_flight.is_some(),
        };
        self.apply(self.issued, snapshot, gate)
    }

    fn apply(
        &mut self,
        sequence: u64,
        snapshot: RefreshSnapshot,
        gate: RefreshGate,
    ) -> AnalyticsResult<RefreshOutcome> {
        let Some(patterns) = snapshot.patterns else {
            return Ok(RefreshOutcome {
                sequence,
                metrics: None,
                events: Vec::new(),
                using_fallback_data: snapshot.using_fallback_data,
            });
        };

        let metrics = MonitoredMetrics::compute(&patterns, self.default_window)?;
        let (next, events) = notifier::diff(&self.notifier, &metrics, gate);
        self.notifier = next;
        self.metrics = Some(metrics);
        self.log.append_all(events.iter().cloned());

        if !events.is_empty() {
            tracing::info!(
                sequence,
                emitted = events.len(),
                hot_bucket = %metrics.hot_bucket,
                stability = %metrics.stability,
                "Monitored metrics changed"
            );
        }

        Ok(RefreshOutcome {
            sequence,
            metrics: Some(metrics),
            events,
            using_fallback_data: gate.using_fallback_data,
        })
    }

    /// Metrics from the most recently applied snapshot.
    pub fn current_metrics(&self) -> Option<&MonitoredMetrics> {
        self.metrics.as_ref()
    }

    /// Previous-value state used for the next diff.
    pub fn notifier_state(&self) -> &NotifierState {
        &self.notifier
    }

    /// The notification log.
    pub fn log(&self) -> &NotificationLog {
        &self.log
    }

    /// Marks every notification read.
    pub fn mark_all_read(&mut self) {
        self.log.mark_all_read();
    }

    /// Marks one notification read. Returns false if it is not in the log.
    pub fn mark_read(&mut self, id: Uuid) -> bool {
        self.log.mark_read(id)
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.log.unread_count()
    }
}
