//! Cache store trait.
//!
//! Any durable keyed store supporting atomic upsert-by-key and point
//! read-by-key satisfies this boundary; the storage technology behind it
//! is an external choice.

use async_trait::async_trait;
use orbsync_core::{CacheEntry, DatasetType, OrbSyncResult, ScopeKey};

/// Keyed storage of the latest cache entry per scope.
///
/// Implementations must be thread-safe. The upsert for a given scope key
/// must be atomic with respect to concurrent reads.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Point read of the current entry for a scope, or None if the scope
    /// was never fetched.
    async fn get(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<Option<CacheEntry>>;

    /// Atomically replace the entry for the scope named by `entry`.
    ///
    /// Rejects writes that would move `last_synced_at` backwards; the
    /// freshness clock is monotone.
    async fn upsert(&self, entry: CacheEntry) -> OrbSyncResult<()>;

    /// Number of entries currently stored and related counters.
    async fn stats(&self) -> OrbSyncResult<CacheStats>;
}

/// Statistics about store usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of scope entries currently stored.
    pub entry_count: u64,
    /// Number of upserts committed since process start.
    pub generations_written: u64,
    /// Number of point reads served.
    pub reads: u64,
}
