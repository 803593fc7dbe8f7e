//! In-memory cache store backend.

use crate::traits::{CacheStats, CacheStore};
use async_trait::async_trait;
use orbsync_core::{CacheEntry, DatasetType, OrbSyncResult, ScopeKey, StoreError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

type ScopeId = (DatasetType, ScopeKey);

/// Cache store backed by a process-local map.
///
/// Whole-entry replacement under the write lock gives the all-or-nothing
/// upsert the sync layer requires; readers hold the read lock only long
/// enough to clone the entry out.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<ScopeId, CacheEntry>>,
    generations_written: AtomicU64,
    reads: AtomicU64,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<Option<CacheEntry>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.read().await;
        Ok(entries.get(&(dataset_type, scope_key.clone())).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> OrbSyncResult<()> {
        let key = (entry.dataset_type, entry.scope_key.clone());
        let mut entries = self.entries.write().await;

        if let Some(existing) = entries.get(&key) {
            if entry.last_synced_at < existing.last_synced_at {
                return Err(StoreError::TimestampRegression {
                    dataset_type: entry.dataset_type,
                    scope_key: entry.scope_key,
                    current: existing.last_synced_at,
                    attempted: entry.last_synced_at,
                }
                .into());
            }
        }

        entries.insert(key, entry);
        self.generations_written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn stats(&self) -> OrbSyncResult<CacheStats> {
        let entries = self.entries.read().await;
        Ok(CacheStats {
            entry_count: entries.len() as u64,
            generations_written: self.generations_written.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orbsync_core::RecordSet;
    use serde_json::json;
    use std::sync::Arc;

    fn entry_at(
        scope: ScopeKey,
        synced_at: chrono::DateTime<Utc>,
        records: Vec<serde_json::Value>,
    ) -> CacheEntry {
        CacheEntry::new_generation(
            DatasetType::OrbitalElements,
            scope,
            RecordSet::new(DatasetType::OrbitalElements, records),
            synced_at,
        )
    }

    #[tokio::test]
    async fn test_get_missing_scope_returns_none() {
        let store = InMemoryCacheStore::new();
        let result = store
            .get(DatasetType::Catalog, &ScopeKey::Global)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let store = InMemoryCacheStore::new();
        let now = Utc::now();
        let scope = ScopeKey::object("25544");
        store
            .upsert(entry_at(scope.clone(), now, vec![json!({"NORAD_CAT_ID": "25544"})]))
            .await
            .unwrap();

        let fetched = store
            .get(DatasetType::OrbitalElements, &scope)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.last_synced_at, now);
        assert_eq!(fetched.payload.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_timestamp_regression() {
        let store = InMemoryCacheStore::new();
        let now = Utc::now();
        let scope = ScopeKey::Global;
        store
            .upsert(entry_at(scope.clone(), now, vec![]))
            .await
            .unwrap();

        let older = entry_at(scope, now - chrono::Duration::hours(1), vec![]);
        let err = store.upsert(older).await.unwrap_err();
        assert!(matches!(
            err,
            orbsync_core::OrbSyncError::Store(StoreError::TimestampRegression { .. })
        ));
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_generation() {
        let store = InMemoryCacheStore::new();
        let scope = ScopeKey::Global;
        let t0 = Utc::now();
        store
            .upsert(entry_at(
                scope.clone(),
                t0,
                vec![json!({"NORAD_CAT_ID": "1"}), json!({"NORAD_CAT_ID": "2"})],
            ))
            .await
            .unwrap();
        store
            .upsert(entry_at(
                scope.clone(),
                t0 + chrono::Duration::hours(1),
                vec![json!({"NORAD_CAT_ID": "3"})],
            ))
            .await
            .unwrap();

        let fetched = store
            .get(DatasetType::OrbitalElements, &scope)
            .await
            .unwrap()
            .unwrap();
        // Old records are gone entirely; no mixing of generations.
        assert_eq!(fetched.payload.len(), 1);
        assert!(fetched.payload.find("3").is_some());
        assert!(fetched.payload.find("1").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_readers_see_single_generation() {
        let store = Arc::new(InMemoryCacheStore::new());
        let scope = ScopeKey::Global;
        let t0 = Utc::now();

        // Seed with generation A: two records sharing a marker.
        store
            .upsert(entry_at(
                scope.clone(),
                t0,
                vec![
                    json!({"NORAD_CAT_ID": "1", "gen": "A"}),
                    json!({"NORAD_CAT_ID": "2", "gen": "A"}),
                ],
            ))
            .await
            .unwrap();

        let writer = {
            let store = Arc::clone(&store);
            let scope = scope.clone();
            tokio::spawn(async move {
                for i in 1..50i64 {
                    store
                        .upsert(entry_at(
                            scope.clone(),
                            t0 + chrono::Duration::milliseconds(i),
                            vec![
                                json!({"NORAD_CAT_ID": "1", "gen": "B"}),
                                json!({"NORAD_CAT_ID": "2", "gen": "B"}),
                            ],
                        ))
                        .await
                        .unwrap();
                }
            })
        };

        for _ in 0..200 {
            let entry = store
                .get(DatasetType::OrbitalElements, &scope)
                .await
                .unwrap()
                .unwrap();
            let gens: Vec<&str> = entry
                .payload
                .records
                .iter()
                .map(|r| r["gen"].as_str().unwrap())
                .collect();
            // Every record in a read belongs to the same generation.
            assert!(gens.windows(2).all(|w| w[0] == w[1]));
        }

        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_counts() {
        let store = InMemoryCacheStore::new();
        let now = Utc::now();
        store
            .upsert(entry_at(ScopeKey::Global, now, vec![]))
            .await
            .unwrap();
        store
            .upsert(entry_at(ScopeKey::object("25544"), now, vec![]))
            .await
            .unwrap();
        let _ = store.get(DatasetType::OrbitalElements, &ScopeKey::Global).await;

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.generations_written, 2);
        assert_eq!(stats.reads, 1);
    }
}
