//! In-memory record store keyed by id.

use std::collections::BTreeMap;

use serde::Serialize;
use soldash_core::Record;
use tokio::sync::RwLock;

/// Outcome of a bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    /// Records submitted.
    pub total: usize,
    /// Records that were new.
    pub inserted: usize,
}

impl InsertSummary {
    /// Submitted records whose id was already stored.
    pub fn duplicates(&self) -> usize {
        self.total - self.inserted
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Number of stored records.
    pub total_records: usize,
    /// Lowest stored id.
    pub oldest_id: Option<i64>,
    /// Highest stored id.
    pub newest_id: Option<i64>,
    /// The record with the highest id.
    pub latest: Option<Record>,
}

/// Record store. Duplicate ids are skipped on insert, never overwritten.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: RwLock<BTreeMap<i64, Record>>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records, re-deriving each bucket from its percentile.
    pub async fn insert_records(&self, records: Vec<Record>) -> InsertSummary {
        let total = records.len();
        let mut inserted = 0;

        let mut store = self.records.write().await;
        for record in records {
            if store.contains_key(&record.id) {
                continue;
            }
            if !record.bucket_is_consistent() {
                tracing::debug!(
                    id = record.id,
                    bucket = %record.bucket,
                    percentile = record.position_percentile,
                    "Re-bucketing record with inconsistent decile"
                );
            }
            let record = record.normalized();
            store.insert(record.id, record);
            inserted += 1;
        }

        InsertSummary { total, inserted }
    }

    /// The `limit` most recent records, highest id first.
    pub async fn recent(&self, limit: usize) -> Vec<Record> {
        self.records
            .read()
            .await
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// All records in ascending id order.
    pub async fn all(&self) -> Vec<Record> {
        self.records.read().await.values().cloned().collect()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Count and id range.
    pub async fn stats(&self) -> StoreStats {
        let records = self.records.read().await;
        StoreStats {
            total_records: records.len(),
            oldest_id: records.keys().next().copied(),
            newest_id: records.keys().next_back().copied(),
            latest: records.values().next_back().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soldash_core::Decile;

    fn record(id: i64, percentile: f64) -> Record {
        Record::new(id, 1.0, 100, "alice", percentile)
    }

    #[tokio::test]
    async fn test_insert_skips_duplicates() {
        let store = RecordStore::new();
        let first = store
            .insert_records(vec![record(1, 5.0), record(2, 15.0)])
            .await;
        assert_eq!(first.inserted, 2);

        let second = store
            .insert_records(vec![record(2, 99.0), record(3, 25.0)])
            .await;
        assert_eq!(second.total, 2);
        assert_eq!(second.inserted, 1);
        assert_eq!(second.duplicates(), 1);

        // the original record 2 is kept
        let all = store.all().await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].bucket, Decile::new(2).unwrap());
    }

    #[tokio::test]
    async fn test_insert_rebuckets() {
        let store = RecordStore::new();
        let mut bad = record(1, 42.0);
        bad.bucket = Decile::MAX;
        store.insert_records(vec![bad]).await;

        let stored = store.all().await;
        assert_eq!(stored[0].bucket, Decile::new(5).unwrap());
    }

    #[tokio::test]
    async fn test_recent_and_stats() {
        let store = RecordStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.stats().await.latest, None);

        store
            .insert_records(vec![record(5, 1.0), record(3, 1.0), record(9, 1.0)])
            .await;

        let recent: Vec<i64> = store.recent(2).await.iter().map(|r| r.id).collect();
        assert_eq!(recent, vec![9, 5]);

        let stats = store.stats().await;
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.oldest_id, Some(3));
        assert_eq!(stats.newest_id, Some(9));
        assert_eq!(stats.latest.map(|r| r.id), Some(9));
    }
}
