//! Core data types for the SolDash analytics dashboard.
//!
//! This module defines the fundamental types shared by the analytics engine,
//! the HTTP service and the CLI:
//!
//! - Game records as received from the data provider (immutable once received)
//! - Decile buckets partitioning the 0-100 percentile scale
//! - Per-window bucketed patterns (pre-aggregated by the provider)
//! - Derived leaderboard entries and stability verdicts
//! - Notification events produced by change detection
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Decile Buckets
// ============================================================================

/// One of the ten equal-width ranges partitioning the 0-100 percentile scale.
///
/// Always holds a value in `1..=10`. Serialized as a plain integer so it can
/// be used directly as a JSON map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Decile(u8);

impl Decile {
    /// Lowest decile (0-10%).
    pub const MIN: Decile = Decile(1);

    /// Highest decile (91-100%).
    pub const MAX: Decile = Decile(10);

    /// Number of deciles.
    pub const COUNT: usize = 10;

    /// Creates a decile from its index, or `None` if outside `1..=10`.
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index >= 1 && index <= 10 {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Maps a position percentile to its decile.
    ///
    /// `clamp(ceil(percentile / 10), 1, 10)`. Non-finite input lands in the
    /// lowest decile.
    #[must_use]
    pub fn from_percentile(percentile: f64) -> Self {
        if !percentile.is_finite() {
            return Self::MIN;
        }
        let raw = (percentile / 10.0).ceil();
        Self(raw.clamp(1.0, 10.0) as u8)
    }

    /// Returns the decile index (1-10).
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Iterates over all ten deciles in ascending order.
    pub fn all() -> impl Iterator<Item = Decile> {
        (1..=10).map(Decile)
    }
}

impl fmt::Display for Decile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Decile {
    type Error = DecileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(DecileError::OutOfRange(i64::from(value)))
    }
}

impl From<Decile> for u8 {
    fn from(decile: Decile) -> Self {
        decile.0
    }
}

impl FromStr for Decile {
    type Err = DecileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| DecileError::NotANumber)?;
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(DecileError::OutOfRange(value))
    }
}

/// Error type for parsing a Decile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecileError {
    /// The value was outside `1..=10`.
    OutOfRange(i64),
    /// The string was not an integer.
    NotANumber,
}

impl fmt::Display for DecileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(value) => {
                write!(f, "invalid decile: expected 1-10, got {}", value)
            }
            Self::NotANumber => write!(f, "invalid decile: not an integer"),
        }
    }
}

impl std::error::Error for DecileError {}

// ============================================================================
// Records
// ============================================================================

/// A single historical game record.
///
/// Field aliases accept the provider's original column names so imports from
/// the browser scraper deserialize unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique, monotonically increasing game identifier.
    #[serde(alias = "game_id")]
    pub id: i64,

    /// Total pot size.
    #[serde(alias = "game_value")]
    pub value: f64,

    /// The winning ticket number.
    #[serde(alias = "winning_ticket")]
    pub winning_key: u64,

    /// Username of the winner.
    #[serde(alias = "winner")]
    pub actor: String,

    /// Position of the winning ticket as a percentage of the pot (0-100).
    #[serde(alias = "ticket_percentile")]
    pub position_percentile: f64,

    /// Decile the winning ticket fell in.
    #[serde(alias = "decile")]
    pub bucket: Decile,

    /// Block hash used as the randomness source, when known.
    #[serde(default, alias = "eos_block", skip_serializing_if = "Option::is_none")]
    pub auxiliary_hash: Option<String>,

    /// When the game ended, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record {
    /// Creates a record, deriving the bucket from the percentile.
    pub fn new(
        id: i64,
        value: f64,
        winning_key: u64,
        actor: impl Into<String>,
        position_percentile: f64,
    ) -> Self {
        Self {
            id,
            value,
            winning_key,
            actor: actor.into(),
            position_percentile,
            bucket: Decile::from_percentile(position_percentile),
            auxiliary_hash: None,
            timestamp: None,
        }
    }

    /// Returns true if `bucket` agrees with `position_percentile`.
    #[must_use]
    pub fn bucket_is_consistent(&self) -> bool {
        self.bucket == Decile::from_percentile(self.position_percentile)
    }

    /// Returns a copy with the bucket recomputed from the percentile.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.bucket = Decile::from_percentile(self.position_percentile);
        self
    }
}

// ============================================================================
// Windows
// ============================================================================

/// The three fixed window sizes the provider aggregates patterns for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PatternWindow {
    /// The 10 most recent records.
    #[default]
    Last10,
    /// The 30 most recent records.
    Last30,
    /// The 50 most recent records.
    Last50,
}

impl PatternWindow {
    /// All pattern windows, smallest first.
    pub const ALL: [PatternWindow; 3] = [Self::Last10, Self::Last30, Self::Last50];

    /// Number of records in the window.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Last10 => 10,
            Self::Last30 => 30,
            Self::Last50 => 50,
        }
    }
}

impl fmt::Display for PatternWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.size())
    }
}

impl TryFrom<usize> for PatternWindow {
    type Error = WindowError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(Self::Last10),
            30 => Ok(Self::Last30),
            50 => Ok(Self::Last50),
            other => Err(WindowError(other.to_string())),
        }
    }
}

impl From<PatternWindow> for usize {
    fn from(window: PatternWindow) -> Self {
        window.size()
    }
}

impl FromStr for PatternWindow {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map_err(|_| WindowError(s.to_string()))
            .and_then(Self::try_from)
    }
}

/// Windowing applied to the record set before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowSelection {
    /// Every record.
    #[default]
    All,
    /// The N most recent records by id.
    Last(usize),
}

impl fmt::Display for WindowSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Last(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for WindowSelection {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse::<usize>()
            .map(Self::Last)
            .map_err(|_| WindowError(s.to_string()))
    }
}

impl From<PatternWindow> for WindowSelection {
    fn from(window: PatternWindow) -> Self {
        Self::Last(window.size())
    }
}

/// Error returned for an unrecognised window size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowError(pub String);

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid window size: {}", self.0)
    }
}

impl std::error::Error for WindowError {}

// ============================================================================
// Patterns
// ============================================================================

/// Decile distribution for one window, as supplied by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketedPattern {
    /// Number of records the pattern was computed from.
    pub sample_size: usize,

    /// Count of records per decile.
    pub distribution: BTreeMap<Decile, u32>,

    /// Share of records per decile, in percent.
    pub percentages: BTreeMap<Decile, f64>,

    /// Decile with the highest share.
    pub hottest_bucket: Decile,

    /// Decile with the lowest share.
    pub coldest_bucket: Decile,
}

impl BucketedPattern {
    /// Tolerance for the percentage sum invariant (two-decimal rounding).
    pub const PERCENT_TOLERANCE: f64 = 0.1;

    /// An all-zero pattern over an empty sample.
    pub fn empty() -> Self {
        Self {
            sample_size: 0,
            distribution: Decile::all().map(|d| (d, 0)).collect(),
            percentages: Decile::all().map(|d| (d, 0.0)).collect(),
            hottest_bucket: Decile::MIN,
            coldest_bucket: Decile::MIN,
        }
    }

    /// Returns true if the distribution sums to the sample size and the
    /// percentages sum to ~100 (or the sample is empty).
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let total: u64 = self.distribution.values().map(|&c| u64::from(c)).sum();
        if total != self.sample_size as u64 {
            return false;
        }
        if self.sample_size == 0 {
            return true;
        }
        let percent: f64 = self.percentages.values().sum();
        (percent - 100.0).abs() <= Self::PERCENT_TOLERANCE
    }
}

/// Patterns for the three fixed windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSet {
    /// Pattern over the last 10 records.
    pub last_10: BucketedPattern,
    /// Pattern over the last 30 records.
    pub last_30: BucketedPattern,
    /// Pattern over the last 50 records.
    pub last_50: BucketedPattern,
}

impl PatternSet {
    /// Returns the pattern for a window.
    #[must_use]
    pub fn get(&self, window: PatternWindow) -> &BucketedPattern {
        match window {
            PatternWindow::Last10 => &self.last_10,
            PatternWindow::Last30 => &self.last_30,
            PatternWindow::Last50 => &self.last_50,
        }
    }
}

// ============================================================================
// Derived Types
// ============================================================================

/// Per-actor aggregate over a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// The actor (winner username).
    pub actor: String,
    /// Sum of record values.
    pub total_value: f64,
    /// Number of records.
    pub count: usize,
    /// Record count per decile.
    pub bucket_breakdown: BTreeMap<Decile, u32>,
}

/// Agreement of the hottest decile across the three pattern windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityVerdict {
    /// All three windows agree.
    Stable,
    /// Exactly one pair of windows agrees.
    SemiStable,
    /// No two windows agree.
    Unstable,
}

impl fmt::Display for StabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Stable => "stable",
            Self::SemiStable => "semi-stable",
            Self::Unstable => "unstable",
        };
        f.write_str(label)
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Informational drift.
    Info,
    /// An improvement worth celebrating.
    Success,
    /// A degradation the operator should look at.
    Error,
}

/// A notification produced by change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique identifier.
    pub id: Uuid,
    /// Human-readable description of the transition.
    pub message: String,
    /// Severity.
    pub kind: NotificationKind,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// Whether the operator has seen it.
    pub read: bool,
}

impl NotificationEvent {
    /// Creates a new unread event stamped with the current time.
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
            read: false,
        }
    }
}
