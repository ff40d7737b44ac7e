//! Hot/cold zones and a plain-language recommendation for one window.

use serde::{Deserialize, Serialize};
use soldash_core::{BucketedPattern, Decile};

use crate::classifier::range_description;

/// Share of the requested window a decile needs to count as a hot zone.
pub const HOT_ZONE_SHARE: f64 = 0.15;

/// Minimum sample size for a recommendation.
pub const MIN_SAMPLE_FOR_RECOMMENDATION: usize = 10;

/// Strategic reading of one window's pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategicInsight {
    /// Deciles at or above the hot-zone threshold, ascending.
    pub hot_zones: Vec<Decile>,
    /// Deciles with no wins, ascending.
    pub cold_zones: Vec<Decile>,
    /// Range description of the hottest decile.
    pub most_common_range: String,
    /// Range description of the coldest decile.
    pub least_common_range: String,
    /// Number of records behind the pattern.
    pub sample_size: usize,
    /// Recommendation text.
    pub recommendation: String,
}

/// Builds the insight for a pattern computed over a `window_size` request.
///
/// The hot-zone threshold scales with the requested window, not the actual
/// sample, so a short history never promotes a single win to a hot zone.
pub fn strategic_insight(pattern: &BucketedPattern, window_size: usize) -> StrategicInsight {
    let threshold = window_size as f64 * HOT_ZONE_SHARE;

    let hot_zones: Vec<Decile> = pattern
        .distribution
        .iter()
        .filter(|&(_, &count)| f64::from(count) >= threshold)
        .map(|(&d, _)| d)
        .collect();
    let cold_zones: Vec<Decile> = pattern
        .distribution
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&d, _)| d)
        .collect();

    let recommendation = recommend(pattern.sample_size, &hot_zones);

    StrategicInsight {
        most_common_range: range_description(pattern.hottest_bucket).to_string(),
        least_common_range: range_description(pattern.coldest_bucket).to_string(),
        sample_size: pattern.sample_size,
        hot_zones,
        cold_zones,
        recommendation,
    }
}

fn recommend(sample_size: usize, hot_zones: &[Decile]) -> String {
    if sample_size < MIN_SAMPLE_FOR_RECOMMENDATION {
        return "Insufficient data for reliable recommendations. Collect more historical games."
            .to_string();
    }

    match hot_zones {
        [] => "Pattern appears random. Use bankroll management and expected value calculations."
            .to_string(),
        [only] => format!(
            "Strong pattern detected: {} is winning frequently. Consider positioning bets in this range.",
            range_description(*only)
        ),
        zones if zones.len() > 5 => {
            "Pattern is widely distributed. No clear hot zone. Use standard probability-based betting."
                .to_string()
        }
        zones => {
            let ranges: Vec<&str> = zones.iter().take(3).map(|&d| range_description(d)).collect();
            format!(
                "Multiple hot zones detected: {}. Spread bets across these ranges.",
                ranges.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u8) -> Decile {
        Decile::new(n).unwrap()
    }

    fn pattern(counts: [u32; 10]) -> BucketedPattern {
        let mut pattern = BucketedPattern::empty();
        for (decile, count) in Decile::all().zip(counts) {
            pattern.distribution.insert(decile, count);
        }
        pattern.sample_size = counts.iter().sum::<u32>() as usize;
        pattern
    }

    #[test]
    fn insufficient_sample() {
        let insight = strategic_insight(&pattern([1, 0, 0, 0, 0, 0, 0, 0, 0, 0]), 10);
        assert!(insight.recommendation.starts_with("Insufficient data"));
        assert_eq!(insight.sample_size, 1);
        assert_eq!(insight.cold_zones.len(), 9);
    }

    #[test]
    fn single_hot_zone() {
        // threshold for window 10 is 1.5
        let mut p = pattern([1, 1, 1, 1, 1, 1, 1, 1, 0, 2]);
        p.hottest_bucket = d(10);
        p.coldest_bucket = d(9);
        let insight = strategic_insight(&p, 10);
        assert_eq!(insight.hot_zones, vec![d(10)]);
        assert_eq!(insight.cold_zones, vec![d(9)]);
        assert!(insight.recommendation.contains("91-100% of pot"));
        assert_eq!(insight.most_common_range, "91-100% of pot (Extreme High)");
        assert_eq!(insight.least_common_range, "81-90% of pot (Very High)");
    }

    #[test]
    fn multiple_hot_zones_names_first_three() {
        let insight = strategic_insight(&pattern([2, 2, 2, 2, 2, 0, 0, 0, 0, 0]), 10);
        assert_eq!(insight.hot_zones.len(), 5);
        assert!(insight.recommendation.starts_with("Multiple hot zones"));
        assert!(insight.recommendation.contains("21-30% of pot"));
        assert!(!insight.recommendation.contains("31-40% of pot"));
    }

    #[test]
    fn widely_distributed() {
        let insight = strategic_insight(&pattern([2, 2, 2, 2, 2, 2, 0, 0, 0, 0]), 10);
        assert_eq!(insight.hot_zones.len(), 6);
        assert!(insight.recommendation.starts_with("Pattern is widely distributed"));
    }

    #[test]
    fn random_when_no_hot_zone() {
        // threshold for window 50 is 7.5
        let insight = strategic_insight(&pattern([5, 5, 5, 5, 5, 5, 5, 5, 5, 5]), 50);
        assert!(insight.hot_zones.is_empty());
        assert!(insight.recommendation.starts_with("Pattern appears random"));
    }
}
