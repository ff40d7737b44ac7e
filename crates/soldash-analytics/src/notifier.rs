//! Change detection for the monitored metrics.
//!
//! Three derived values are watched between refreshes:
//!
//! - the hottest decile of the default window
//! - the suggested timing derived from that decile
//! - the stability verdict across the 10/30/50 windows
//!
//! [`diff`] is a pure function `(previous state, current metrics, gate) ->
//! (next state, events)`. The caller owns the state and swaps it in whole,
//! so the read that computed a transition and the write of the new previous
//! values can never interleave with another refresh.
//!
//! ## Emission rules
//!
//! - Suppressed refreshes (fallback data, refresh in flight) leave the state
//!   untouched and emit nothing.
//! - The first eligible refresh only records the values.
//! - Every later eligible refresh emits one event per metric whose value
//!   changed, then records all current values whether or not anything fired.

use serde::{Deserialize, Serialize};
use soldash_core::{
    Decile, NotificationEvent, NotificationKind, PatternSet, PatternWindow, StabilityVerdict,
};

use crate::AnalyticsResult;
use crate::ranking::{Extreme, select_extreme, suggested_timing};
use crate::stability::classify_patterns;

/// Snapshot of the watched values for one refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredMetrics {
    /// Hottest decile of the default window.
    pub hot_bucket: Decile,
    /// Suggested timing (percent of pot) derived from the hottest decile.
    pub suggested_timing: u8,
    /// Stability verdict across the three windows.
    pub stability: StabilityVerdict,
}

impl MonitoredMetrics {
    /// Derives the metrics from a pattern set.
    pub fn compute(patterns: &PatternSet, default_window: PatternWindow) -> AnalyticsResult<Self> {
        let hot_bucket = select_extreme(&patterns.get(default_window).percentages, Extreme::Max)?;
        Ok(Self {
            hot_bucket,
            suggested_timing: suggested_timing(hot_bucket),
            stability: classify_patterns(patterns)?,
        })
    }
}

/// Previously observed values. All unset until the first eligible refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierState {
    /// Hottest decile seen on the last eligible refresh.
    pub prev_hot_bucket: Option<Decile>,
    /// Suggested timing seen on the last eligible refresh.
    pub prev_suggested_timing: Option<u8>,
    /// Stability verdict seen on the last eligible refresh.
    pub prev_stability: Option<StabilityVerdict>,
}

impl NotifierState {
    /// State recording `metrics` as the previous values.
    pub fn observed(metrics: &MonitoredMetrics) -> Self {
        Self {
            prev_hot_bucket: Some(metrics.hot_bucket),
            prev_suggested_timing: Some(metrics.suggested_timing),
            prev_stability: Some(metrics.stability),
        }
    }

    /// True before the first eligible refresh.
    pub fn is_initial(&self) -> bool {
        self.prev_hot_bucket.is_none()
            && self.prev_suggested_timing.is_none()
            && self.prev_stability.is_none()
    }
}

/// Conditions under which a refresh must not drive notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshGate {
    /// The patterns are placeholder data substituted for a failed provider.
    pub using_fallback_data: bool,
    /// Another refresh is outstanding and will supersede this one.
    pub refresh_in_flight: bool,
}

impl RefreshGate {
    /// A refresh backed by real provider data with nothing outstanding.
    pub fn live() -> Self {
        Self::default()
    }

    /// A refresh backed by placeholder data.
    pub fn fallback() -> Self {
        Self {
            using_fallback_data: true,
            ..Self::default()
        }
    }

    /// True if the refresh must be ignored entirely.
    pub fn suppresses(&self) -> bool {
        self.using_fallback_data || self.refresh_in_flight
    }
}

/// Compares current metrics against the previous state.
pub fn diff(
    prev: &NotifierState,
    current: &MonitoredMetrics,
    gate: RefreshGate,
) -> (NotifierState, Vec<NotificationEvent>) {
    if gate.suppresses() {
        return (*prev, Vec::new());
    }

    let next = NotifierState::observed(current);
    if prev.is_initial() {
        return (next, Vec::new());
    }

    let mut events = Vec::new();

    if let Some(old) = prev.prev_hot_bucket.filter(|&old| old != current.hot_bucket) {
        events.push(NotificationEvent::new(
            NotificationKind::Info,
            format!(
                "Hot decile shifted: {} → {}",
                old, current.hot_bucket
            ),
        ));
    }

    if let Some(old) = prev
        .prev_suggested_timing
        .filter(|&old| old != current.suggested_timing)
    {
        events.push(NotificationEvent::new(
            NotificationKind::Info,
            format!(
                "Suggested timing moved: {}% → {}%",
                old, current.suggested_timing
            ),
        ));
    }

    if let Some(old) = prev.prev_stability.filter(|&old| old != current.stability) {
        let (kind, message) = stability_transition(old, current.stability);
        events.push(NotificationEvent::new(kind, message));
    }

    (next, events)
}

fn stability_transition(old: StabilityVerdict, new: StabilityVerdict) -> (NotificationKind, String) {
    use StabilityVerdict::{SemiStable, Stable, Unstable};

    match (old, new) {
        (_, Unstable) => (
            NotificationKind::Error,
            format!("Pattern stability degraded: {} → {}", old, new),
        ),
        (_, Stable) => (
            NotificationKind::Success,
            format!("Pattern stabilized: {} → {}", old, new),
        ),
        (Unstable, SemiStable) => (
            NotificationKind::Info,
            format!("Pattern stability improving: {} → {}", old, new),
        ),
        _ => (
            NotificationKind::Info,
            format!("Pattern stability weakened: {} → {}", old, new),
        ),
    }
}
