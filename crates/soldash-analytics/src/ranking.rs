//! Hottest/coldest decile selection.
//!
//! Every caller that needs "the hottest decile" goes through
//! [`select_extreme`], so the tie-breaking rule is defined exactly once:
//! entries are ordered by percentage, and equal percentages fall back to
//! ascending decile index (the lowest decile wins a tie).

use serde::{Deserialize, Serialize};
use soldash_core::Decile;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::{AnalyticsError, AnalyticsResult};

/// Which end of the distribution to select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extreme {
    /// Highest percentage.
    Max,
    /// Lowest percentage.
    Min,
}

/// Selects the decile with the highest or lowest percentage.
///
/// Fails with [`AnalyticsError::InvalidInput`] on an empty mapping rather
/// than inventing a default decile.
pub fn select_extreme(
    percentages: &BTreeMap<Decile, f64>,
    mode: Extreme,
) -> AnalyticsResult<Decile> {
    let mut entries: Vec<(Decile, f64)> = percentages.iter().map(|(&d, &p)| (d, p)).collect();
    if entries.is_empty() {
        return Err(AnalyticsError::InvalidInput(
            "cannot rank an empty percentage mapping".to_string(),
        ));
    }

    entries.sort_by(|a, b| rank_order(a, b, mode));
    Ok(entries[0].0)
}

fn rank_order(a: &(Decile, f64), b: &(Decile, f64), mode: Extreme) -> Ordering {
    let by_value = match mode {
        Extreme::Max => b.1.total_cmp(&a.1),
        Extreme::Min => a.1.total_cmp(&b.1),
    };
    by_value.then_with(|| a.0.cmp(&b.0))
}

/// Suggested entry point within the pot: the midpoint of the decile's range.
pub fn suggested_timing(decile: Decile) -> u8 {
    decile.get() * 10 - 5
}

/// Hottest and coldest decile of one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extremes {
    /// Decile with the highest percentage.
    pub hottest: Decile,
    /// Decile with the lowest percentage.
    pub coldest: Decile,
}

/// Selects both ends of a distribution.
pub fn extremes(percentages: &BTreeMap<Decile, f64>) -> AnalyticsResult<Extremes> {
    Ok(Extremes {
        hottest: select_extreme(percentages, Extreme::Max)?,
        coldest: select_extreme(percentages, Extreme::Min)?,
    })
}
