//! Aggregations over a record set.
//!
//! ## Leaderboard
//!
//! Records are grouped by actor in first-encountered order, then stably
//! sorted by total value (descending), so equal totals keep the order in
//! which their actors first appeared.
//!
//! ## Histogram
//!
//! `bin_size = ceil((max - min + 1) / bin_count)` and a record lands in
//! `floor((key - min) / bin_size)`, clamped to the last bin. An empty record
//! set produces an empty histogram.
//!
//! ## Dispersion
//!
//! Population statistics (divide by N) over a decile percentage mapping,
//! plus a consistency score `max(0, 100 - std_dev * 10)`. The score is an
//! ad-hoc heuristic for display: it is not a probability and not a
//! standardized statistic.

use serde::{Deserialize, Serialize};
use soldash_core::{Decile, LeaderboardEntry, Record};
use std::collections::{BTreeMap, HashMap};

use crate::{AnalyticsError, AnalyticsResult};

// ============================================================================
// Leaderboard
// ============================================================================

/// Builds the per-actor leaderboard, highest total value first.
pub fn build_leaderboard(records: &[Record]) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    for record in records {
        let slot = *index.entry(record.actor.as_str()).or_insert_with(|| {
            entries.push(LeaderboardEntry {
                actor: record.actor.clone(),
                total_value: 0.0,
                count: 0,
                bucket_breakdown: BTreeMap::new(),
            });
            entries.len() - 1
        });

        let entry = &mut entries[slot];
        entry.total_value += record.value;
        entry.count += 1;
        *entry.bucket_breakdown.entry(record.bucket).or_insert(0) += 1;
    }

    // sort_by is stable
    entries.sort_by(|a, b| b.total_value.total_cmp(&a.total_value));
    entries
}

/// Builds the leaderboard and keeps the top `k` entries.
pub fn top_leaderboard(records: &[Record], k: usize) -> Vec<LeaderboardEntry> {
    let mut entries = build_leaderboard(records);
    entries.truncate(k);
    entries
}

// ============================================================================
// Histogram
// ============================================================================

/// Fixed-width bins over a ranged key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    /// Inclusive range label per bin, e.g. `"0-9"`.
    pub labels: Vec<String>,
    /// Record count per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Returns true if the histogram has no bins.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of binned records.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Minimum and maximum of a key over the records.
///
/// Non-finite keys are ignored.
pub fn key_range<F>(records: &[Record], key: F) -> AnalyticsResult<(f64, f64)>
where
    F: Fn(&Record) -> f64,
{
    records
        .iter()
        .map(key)
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(AnalyticsError::EmptyRecordSet)
}

/// Bins records by a ranged key into `bin_count` equal-width bins.
pub fn bin_by_range<F>(records: &[Record], key: F, bin_count: usize) -> Histogram
where
    F: Fn(&Record) -> f64,
{
    if bin_count == 0 {
        return Histogram::default();
    }
    let (min, max) = match key_range(records, &key) {
        Ok(range) => range,
        Err(_) => return Histogram::default(),
    };

    let bin_size = ((max - min + 1.0) / bin_count as f64).ceil();
    let mut counts = vec![0usize; bin_count];

    for value in records.iter().map(&key).filter(|v| v.is_finite()) {
        let bin = ((value - min) / bin_size).floor() as usize;
        counts[bin.min(bin_count - 1)] += 1;
    }

    let labels = (0..bin_count)
        .map(|i| {
            let lo = min + i as f64 * bin_size;
            let hi = lo + bin_size - 1.0;
            format!("{}-{}", format_bound(lo), format_bound(hi))
        })
        .collect();

    Histogram { labels, counts }
}

fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

// ============================================================================
// Dispersion
// ============================================================================

/// Spread of a decile percentage distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionMetrics {
    /// Arithmetic mean of the percentages.
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// `max(0, 100 - std_dev * 10)`. Display heuristic only.
    pub consistency_score: f64,
}

/// Computes dispersion metrics, or `None` for an empty mapping.
pub fn dispersion_metrics(percentages: &BTreeMap<Decile, f64>) -> Option<DispersionMetrics> {
    if percentages.is_empty() {
        return None;
    }

    let n = percentages.len() as f64;
    let mean = percentages.values().sum::<f64>() / n;
    let variance = percentages
        .values()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    Some(DispersionMetrics {
        mean,
        variance,
        std_dev,
        consistency_score: (100.0 - std_dev * 10.0).max(0.0),
    })
}
