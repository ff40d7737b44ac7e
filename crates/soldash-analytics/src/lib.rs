//! soldash-analytics: derived analytics and change notification.
//!
//! This crate turns a raw record set and the provider's per-window decile
//! patterns into everything the dashboard displays:
//!
//! - [`classifier`]: percentile → decile, timing labels, range descriptions
//! - [`ranking`]: hottest/coldest decile with deterministic tie-breaking
//! - [`stability`]: agreement of the hottest decile across windows
//! - [`aggregation`]: leaderboards, histograms, dispersion metrics
//! - [`query`]: filter → filter → sort → paginate over the record set
//! - [`notifier`]: diff of monitored metrics between refreshes
//! - [`log`]: bounded newest-first notification store
//! - [`dashboard`]: sequence-guarded refresh pipeline tying it together
//! - [`insight`]: hot/cold zones and strategic recommendations
//!
//! Everything except [`dashboard::Dashboard`] is a pure function or a plain
//! value type. Nothing here performs I/O.

pub mod aggregation;
pub mod classifier;
pub mod dashboard;
pub mod insight;
pub mod log;
pub mod notifier;
pub mod query;
pub mod ranking;
pub mod stability;

pub use aggregation::{DispersionMetrics, Histogram, bin_by_range, build_leaderboard, dispersion_metrics};
pub use dashboard::{Dashboard, RefreshOutcome, RefreshSnapshot, RefreshTicket};
pub use log::NotificationLog;
pub use notifier::{MonitoredMetrics, NotifierState, RefreshGate};
pub use query::{BucketFilter, PAGE_SIZE, QueryEngine, QueryPage, QueryState, SortMode};
pub use ranking::{Extreme, select_extreme, suggested_timing};
pub use stability::{ShiftAnalysis, Trend, classify, classify_trend};

/// Errors raised by the analytics engine.
///
/// None of these are meant for the operator; callers handle them locally
/// (fall back to an empty state, or drop the response).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    /// A ranking or stability function received an empty mapping.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation that needs at least one record received none.
    #[error("empty record set")]
    EmptyRecordSet,

    /// A refresh response arrived after a newer refresh was issued.
    #[error("stale refresh response: sequence {sequence}, latest issued {latest}")]
    StaleResponse {
        /// Sequence number of the discarded response.
        sequence: u64,
        /// Latest sequence number issued.
        latest: u64,
    },
}

/// Result type alias for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
