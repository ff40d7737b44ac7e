//! Record classification helpers.
//!
//! Stateless mappings from a winning ticket's position percentile to its
//! decile, a coarse timing label, and the human description of a decile's pot
//! range.

use serde::{Deserialize, Serialize};
use soldash_core::Decile;
use std::fmt;

/// Coarse position of the winning ticket within the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingLabel {
    /// Deciles 1-3.
    Early,
    /// Deciles 4-7.
    Mid,
    /// Deciles 8-10.
    Late,
}

impl fmt::Display for TimingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Early => "Early",
            Self::Mid => "Mid",
            Self::Late => "Late",
        };
        f.write_str(label)
    }
}

/// Maps a position percentile to its decile.
pub fn decile_for(percentile: f64) -> Decile {
    Decile::from_percentile(percentile)
}

/// Maps a position percentile to its timing label.
pub fn timing_label(percentile: f64) -> TimingLabel {
    timing_label_for(decile_for(percentile))
}

/// Timing label of a decile.
pub fn timing_label_for(decile: Decile) -> TimingLabel {
    match decile.get() {
        1..=3 => TimingLabel::Early,
        4..=7 => TimingLabel::Mid,
        _ => TimingLabel::Late,
    }
}

/// Human description of a decile's share of the pot.
pub fn range_description(decile: Decile) -> &'static str {
    describe_index(i64::from(decile.get()))
}

/// Like [`range_description`] for an unvalidated index; `"Unknown"` outside 1-10.
pub fn describe_index(index: i64) -> &'static str {
    match index {
        1 => "0-10% of pot (Very Low)",
        2 => "11-20% of pot (Low)",
        3 => "21-30% of pot (Low-Medium)",
        4 => "31-40% of pot (Medium-Low)",
        5 => "41-50% of pot (Medium)",
        6 => "51-60% of pot (Medium-High)",
        7 => "61-70% of pot (High-Medium)",
        8 => "71-80% of pot (High)",
        9 => "81-90% of pot (Very High)",
        10 => "91-100% of pot (Extreme High)",
        _ => "Unknown",
    }
}
