//! Pattern data provider.
//!
//! The refresh pipeline asks a [`DataProvider`] for the latest records and
//! their 10/30/50-window decile patterns. [`InMemoryProvider`] computes them
//! from the [`RecordStore`]; anything that can answer asynchronously can be
//! swapped in behind the trait.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use soldash_analytics::ranking::{Extremes, extremes};
use soldash_core::{BucketedPattern, Decile, PatternSet, PatternWindow, Record};

use crate::store::RecordStore;

/// Number of records handed back with each snapshot.
pub const SNAPSHOT_RECORD_LIMIT: usize = 50;

/// Provider response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSnapshot {
    /// Most recent records, highest id first.
    pub records: Vec<Record>,
    /// Patterns for the three fixed windows.
    pub patterns: PatternSet,
    /// Number of records the provider holds in total.
    pub total_count: usize,
}

/// Provider failures. All of them lead to placeholder data, never to a
/// notification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The provider did not answer in time (seconds waited).
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The provider holds no records.
    #[error("no records available")]
    Empty,
}

impl ProviderError {
    /// Operator-facing advisory shown next to placeholder data.
    pub fn advisory(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Data provider unreachable. Showing placeholder patterns.".to_string()
            }
            Self::Timeout(secs) => format!(
                "Data provider did not answer within {}s. Showing placeholder patterns.",
                secs
            ),
            Self::Empty => {
                "No games imported yet. Showing placeholder patterns until data arrives."
                    .to_string()
            }
        }
    }
}

/// Source of records and per-window patterns.
pub trait DataProvider: Send + Sync {
    /// Fetch the current snapshot.
    fn fetch(&self) -> BoxFuture<'_, Result<ProviderSnapshot, ProviderError>>;
}

/// Provider backed by the in-process record store.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    store: Arc<RecordStore>,
}

impl InMemoryProvider {
    /// Create a provider reading from `store`.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }
}

impl DataProvider for InMemoryProvider {
    fn fetch(&self) -> BoxFuture<'_, Result<ProviderSnapshot, ProviderError>> {
        Box::pin(async move {
            let total_count = self.store.len().await;
            if total_count == 0 {
                return Err(ProviderError::Empty);
            }

            let records = self.store.recent(SNAPSHOT_RECORD_LIMIT).await;
            let patterns = aggregate_patterns(&records);

            Ok(ProviderSnapshot {
                records,
                patterns,
                total_count,
            })
        })
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Rounds to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the decile pattern over the first `window_size` records.
///
/// `records` must be ordered most recent first. Fewer records than the
/// window simply yield a smaller sample.
pub fn aggregate_pattern(records: &[Record], window_size: usize) -> BucketedPattern {
    let window = &records[..records.len().min(window_size)];
    if window.is_empty() {
        return BucketedPattern::empty();
    }

    let mut distribution: BTreeMap<Decile, u32> = Decile::all().map(|d| (d, 0)).collect();
    for record in window {
        *distribution.entry(record.bucket).or_insert(0) += 1;
    }

    let sample_size = window.len();
    let percentages: BTreeMap<Decile, f64> = distribution
        .iter()
        .map(|(&d, &count)| (d, round2(f64::from(count) / sample_size as f64 * 100.0)))
        .collect();

    // percentages always covers all ten deciles
    let Extremes { hottest, coldest } = extremes(&percentages).unwrap_or(Extremes {
        hottest: Decile::MIN,
        coldest: Decile::MIN,
    });

    BucketedPattern {
        sample_size,
        distribution,
        percentages,
        hottest_bucket: hottest,
        coldest_bucket: coldest,
    }
}

/// Computes the patterns for the three fixed windows.
pub fn aggregate_patterns(records: &[Record]) -> PatternSet {
    PatternSet {
        last_10: aggregate_pattern(records, PatternWindow::Last10.size()),
        last_30: aggregate_pattern(records, PatternWindow::Last30.size()),
        last_50: aggregate_pattern(records, PatternWindow::Last50.size()),
    }
}

/// Uniform placeholder: one record per decile, 10% each.
pub fn fallback_pattern() -> BucketedPattern {
    BucketedPattern {
        sample_size: Decile::COUNT,
        distribution: Decile::all().map(|d| (d, 1)).collect(),
        percentages: Decile::all().map(|d| (d, 10.0)).collect(),
        hottest_bucket: Decile::MIN,
        coldest_bucket: Decile::MIN,
    }
}

/// Placeholder patterns substituted when the provider fails.
pub fn fallback_patterns() -> PatternSet {
    PatternSet {
        last_10: fallback_pattern(),
        last_30: fallback_pattern(),
        last_50: fallback_pattern(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u8) -> Decile {
        Decile::new(n).unwrap()
    }

    /// Records with ids descending, so the slice is most-recent-first.
    fn records(percentiles: &[f64]) -> Vec<Record> {
        let n = percentiles.len() as i64;
        percentiles
            .iter()
            .enumerate()
            .map(|(i, &p)| Record::new(n - i as i64, 1.0, 1, "alice", p))
            .collect()
    }

    #[test]
    fn test_aggregate_pattern_counts_and_rounds() {
        let pattern = aggregate_pattern(&records(&[5.0, 15.0, 16.0]), 10);

        assert_eq!(pattern.sample_size, 3);
        assert_eq!(pattern.distribution[&d(2)], 2);
        assert_eq!(pattern.percentages[&d(2)], 66.67);
        assert_eq!(pattern.percentages[&d(1)], 33.33);
        assert_eq!(pattern.hottest_bucket, d(2));
        // deciles 3..=10 tie at zero, lowest wins
        assert_eq!(pattern.coldest_bucket, d(3));
        assert!(pattern.is_consistent());
    }

    #[test]
    fn test_aggregate_pattern_respects_window() {
        let mut percentiles = vec![95.0; 10];
        percentiles.extend(vec![5.0; 20]);
        let set = aggregate_patterns(&records(&percentiles));

        assert_eq!(set.last_10.sample_size, 10);
        assert_eq!(set.last_10.hottest_bucket, d(10));
        assert_eq!(set.last_30.sample_size, 30);
        assert_eq!(set.last_30.hottest_bucket, d(1));
        assert_eq!(set.last_50.sample_size, 30);
    }

    #[test]
    fn test_aggregate_empty() {
        let pattern = aggregate_pattern(&[], 10);
        assert_eq!(pattern, BucketedPattern::empty());
    }

    #[test]
    fn test_fallback_is_consistent() {
        let set = fallback_patterns();
        assert!(set.last_10.is_consistent());
        assert_eq!(set.last_50.sample_size, 10);
    }

    #[tokio::test]
    async fn test_in_memory_provider() {
        let store = Arc::new(RecordStore::new());
        let provider = InMemoryProvider::new(store.clone());
        assert_eq!(provider.fetch().await, Err(ProviderError::Empty));

        store.insert_records(records(&[55.0, 55.0, 12.0])).await;
        let snapshot = provider.fetch().await.unwrap();
        assert_eq!(snapshot.total_count, 3);
        assert_eq!(snapshot.records[0].id, 3);
        assert_eq!(snapshot.patterns.last_10.hottest_bucket, d(6));
    }

    #[test]
    fn test_advisory_mentions_timeout() {
        assert!(ProviderError::Timeout(7).advisory().contains("7s"));
        assert!(ProviderError::Empty.advisory().contains("placeholder"));
    }
}
