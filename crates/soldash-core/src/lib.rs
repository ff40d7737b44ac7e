//! soldash-core: shared types for the SolDash analytics dashboard.
//!
//! Records, decile buckets, per-window patterns, derived leaderboard
//! entries, stability verdicts, and notification events. Every other crate in
//! the workspace speaks in these types.

pub mod types;

pub use types::{
    BucketedPattern, Decile, DecileError, LeaderboardEntry, NotificationEvent, NotificationKind,
    PatternSet, PatternWindow, Record, StabilityVerdict, WindowError, WindowSelection,
};
