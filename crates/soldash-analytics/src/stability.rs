//! Agreement of the hottest decile across the 10/30/50 windows.
//!
//! Two views over the same three values:
//!
//! - [`classify`] collapses them into a symmetric [`StabilityVerdict`]
//! - [`classify_trend`] keeps the direction: which windows agree tells
//!   whether a shift is recent or emerging

use serde::{Deserialize, Serialize};
use soldash_core::{Decile, PatternSet, PatternWindow, StabilityVerdict};

use crate::AnalyticsResult;
use crate::ranking::{Extreme, select_extreme};

/// Classifies the hottest deciles of the three windows.
pub fn classify(hot10: Decile, hot30: Decile, hot50: Decile) -> StabilityVerdict {
    let a = hot10 == hot30;
    let b = hot30 == hot50;
    let c = hot10 == hot50;

    let all = a && b && c;
    let any = a || b || c;

    match (all, any) {
        (true, _) => StabilityVerdict::Stable,
        (false, true) => StabilityVerdict::SemiStable,
        (false, false) => StabilityVerdict::Unstable,
    }
}

/// Direction of a pattern shift across windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    /// Same hot decile in every window.
    Stable,
    /// The 10 and 30 windows agree; the 50 window differs.
    RecentShift,
    /// The 30 and 50 windows agree; the 10 window differs.
    NewTrend,
    /// No usable agreement.
    Volatile,
}

impl Trend {
    /// Operator-facing description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Stable => "STABLE - Same hot decile across all time windows",
            Self::RecentShift => "RECENT_SHIFT - Pattern changed in last 30 games",
            Self::NewTrend => "NEW_TREND - New pattern emerging in last 10 games",
            Self::Volatile => "VOLATILE - Pattern changing frequently",
        }
    }
}

/// Classifies the direction of a shift.
///
/// Agreement of only the 10 and 50 windows carries no direction and counts
/// as volatile.
pub fn classify_trend(hot10: Decile, hot30: Decile, hot50: Decile) -> Trend {
    let short = hot10 == hot30;
    let long = hot30 == hot50;

    match (short, long) {
        (true, true) => Trend::Stable,
        (true, false) => Trend::RecentShift,
        (false, true) => Trend::NewTrend,
        (false, false) => Trend::Volatile,
    }
}

/// Hottest decile of each window, via the shared ranking rule.
pub fn hot_buckets(patterns: &PatternSet) -> AnalyticsResult<[Decile; 3]> {
    let mut hot = [Decile::MIN; 3];
    for (slot, window) in hot.iter_mut().zip(PatternWindow::ALL) {
        *slot = select_extreme(&patterns.get(window).percentages, Extreme::Max)?;
    }
    Ok(hot)
}

/// Stability verdict for a full pattern set.
pub fn classify_patterns(patterns: &PatternSet) -> AnalyticsResult<StabilityVerdict> {
    let [h10, h30, h50] = hot_buckets(patterns)?;
    Ok(classify(h10, h30, h50))
}

/// Summary of how the hot decile moves across windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAnalysis {
    /// Hottest decile over the last 10 records.
    pub most_common_10: Decile,
    /// Hottest decile over the last 30 records.
    pub most_common_30: Decile,
    /// Hottest decile over the last 50 records.
    pub most_common_50: Decile,
    /// True when all three agree.
    pub consistent: bool,
    /// Direction of the shift.
    pub trend: Trend,
    /// Human description of the trend.
    pub trend_description: String,
    /// Symmetric stability verdict.
    pub stability: StabilityVerdict,
}

/// Builds a [`ShiftAnalysis`] from a pattern set.
pub fn analyze_shift(patterns: &PatternSet) -> AnalyticsResult<ShiftAnalysis> {
    let [h10, h30, h50] = hot_buckets(patterns)?;
    let trend = classify_trend(h10, h30, h50);
    let stability = classify(h10, h30, h50);

    Ok(ShiftAnalysis {
        most_common_10: h10,
        most_common_30: h30,
        most_common_50: h50,
        consistent: stability == StabilityVerdict::Stable,
        trend,
        trend_description: trend.description().to_string(),
        stability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use soldash_core::BucketedPattern;

    fn d(n: u8) -> Decile {
        Decile::new(n).unwrap()
    }

    fn pattern_hot_at(n: u8) -> BucketedPattern {
        let mut pattern = BucketedPattern::empty();
        pattern.sample_size = 1;
        pattern.distribution.insert(d(n), 1);
        pattern.percentages.insert(d(n), 100.0);
        pattern.hottest_bucket = d(n);
        pattern
    }

    #[test]
    fn classify_covers_every_branch() {
        assert_eq!(classify(d(6), d(6), d(6)), StabilityVerdict::Stable);
        assert_eq!(classify(d(6), d(6), d(9)), StabilityVerdict::SemiStable);
        assert_eq!(classify(d(9), d(6), d(6)), StabilityVerdict::SemiStable);
        assert_eq!(classify(d(6), d(9), d(6)), StabilityVerdict::SemiStable);
        assert_eq!(classify(d(2), d(6), d(9)), StabilityVerdict::Unstable);
    }

    #[test]
    fn trend_covers_every_branch() {
        assert_eq!(classify_trend(d(4), d(4), d(4)), Trend::Stable);
        assert_eq!(classify_trend(d(4), d(4), d(7)), Trend::RecentShift);
        assert_eq!(classify_trend(d(1), d(4), d(4)), Trend::NewTrend);
        assert_eq!(classify_trend(d(4), d(1), d(4)), Trend::Volatile);
        assert_eq!(classify_trend(d(1), d(2), d(3)), Trend::Volatile);
    }

    #[test]
    fn classify_patterns_uses_percentages() {
        let patterns = PatternSet {
            last_10: pattern_hot_at(3),
            last_30: pattern_hot_at(3),
            last_50: pattern_hot_at(8),
        };
        assert_eq!(
            classify_patterns(&patterns).unwrap(),
            StabilityVerdict::SemiStable
        );
    }

    #[test]
    fn empty_percentages_fail() {
        let mut broken = pattern_hot_at(3);
        broken.percentages.clear();
        let patterns = PatternSet {
            last_10: broken,
            last_30: pattern_hot_at(3),
            last_50: pattern_hot_at(3),
        };
        assert!(classify_patterns(&patterns).is_err());
    }

    #[test]
    fn shift_analysis_fields() {
        let patterns = PatternSet {
            last_10: pattern_hot_at(2),
            last_30: pattern_hot_at(5),
            last_50: pattern_hot_at(5),
        };
        let shift = analyze_shift(&patterns).unwrap();
        assert_eq!(shift.most_common_10, d(2));
        assert_eq!(shift.most_common_50, d(5));
        assert!(!shift.consistent);
        assert_eq!(shift.trend, Trend::NewTrend);
        assert_eq!(shift.stability, StabilityVerdict::SemiStable);
        assert!(shift.trend_description.starts_with("NEW_TREND"));
    }

    #[test]
    fn trend_serializes_in_upper_case() {
        let json = serde_json::to_string(&Trend::RecentShift).unwrap();
        assert_eq!(json, "\"RECENT_SHIFT\"");
    }
}
