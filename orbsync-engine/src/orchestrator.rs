//! Sync orchestrator.
//!
//! Decides, per `(dataset, scope)`, whether an upstream fetch is due;
//! performs it with endpoint fallback when it is; commits the result as a
//! new cache generation. The compliance invariant: zero upstream calls
//! before `next_eligible`. The concurrency invariant: at most one in-flight
//! fetch per scope, with concurrent callers degraded non-blockingly to
//! `RefreshSkippedLocked`.

use crate::eligibility::{freshness_meta, next_eligible};
use crate::registry::PolicyRegistry;
use chrono::Utc;
use orbsync_core::{
    CacheEntry, DatasetType, FreshnessMeta, OrbSyncResult, ScopeKey, SyncOutcome, Timestamp,
};
use orbsync_provider::UpstreamProvider;
use orbsync_store::{CacheStore, SyncLockTable};
use std::sync::Arc;

/// Orchestrates policy checks, locking, upstream fetches, and cache commits.
pub struct SyncOrchestrator<S, P> {
    registry: PolicyRegistry,
    store: Arc<S>,
    provider: Arc<P>,
    locks: SyncLockTable,
}

impl<S, P> SyncOrchestrator<S, P>
where
    S: CacheStore,
    P: UpstreamProvider,
{
    pub fn new(registry: PolicyRegistry, store: Arc<S>, provider: Arc<P>) -> Self {
        Self {
            registry,
            store,
            provider,
            locks: SyncLockTable::new(),
        }
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Refresh the scope if its eligibility window is open.
    pub async fn ensure_fresh(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<SyncOutcome> {
        self.ensure_fresh_at(dataset_type, scope_key, Utc::now()).await
    }

    /// `ensure_fresh` against an explicit clock.
    ///
    /// On success the committed `last_synced_at` is `now`, so synthetic
    /// clocks propagate into the stored freshness state.
    pub async fn ensure_fresh_at(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
        now: Timestamp,
    ) -> OrbSyncResult<SyncOutcome> {
        let policy = self.registry.effective_policy(dataset_type, scope_key)?;

        let entry = self.store.get(dataset_type, scope_key).await?;
        let eligible_at = next_eligible(entry.map(|e| e.last_synced_at), policy);
        if now < eligible_at {
            return Ok(SyncOutcome::AlreadyFresh);
        }

        let _guard = match self.locks.try_acquire(dataset_type, scope_key) {
            Some(guard) => guard,
            // Another fetch is in flight; do not wait.
            None => return Ok(SyncOutcome::RefreshSkippedLocked),
        };

        // Re-check under the lock: a fetch that completed between our first
        // read and the acquisition already did the work.
        let entry = self.store.get(dataset_type, scope_key).await?;
        let eligible_at = next_eligible(entry.map(|e| e.last_synced_at), policy);
        if now < eligible_at {
            return Ok(SyncOutcome::AlreadyFresh);
        }

        tracing::info!(
            dataset = %dataset_type,
            scope = %scope_key,
            "eligibility window open, fetching upstream"
        );

        match self.provider.fetch(dataset_type, scope_key).await {
            Ok(payload) => {
                let entry = CacheEntry::new_generation(
                    dataset_type,
                    scope_key.clone(),
                    payload,
                    now,
                );
                let generation = entry.source_generation;
                self.store.upsert(entry).await?;
                tracing::info!(
                    dataset = %dataset_type,
                    scope = %scope_key,
                    %generation,
                    "cache generation committed"
                );
                Ok(SyncOutcome::Refreshed)
            }
            Err(err) => {
                // Prior cache entry untouched; stale-but-available wins
                // over no-data.
                tracing::warn!(
                    dataset = %dataset_type,
                    scope = %scope_key,
                    error = %err,
                    "upstream fetch failed, serving cached data"
                );
                Ok(SyncOutcome::RefreshFailed {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Current freshness metadata for a scope.
    pub async fn freshness(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<FreshnessMeta> {
        let policy = self.registry.effective_policy(dataset_type, scope_key)?;
        let entry = self.store.get(dataset_type, scope_key).await?;
        Ok(freshness_meta(entry.as_ref(), policy))
    }

    /// Current cache entry for a scope, if any.
    pub(crate) async fn entry(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<Option<CacheEntry>> {
        self.store.get(dataset_type, scope_key).await
    }
}

impl<S, P> std::fmt::Debug for SyncOrchestrator<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("in_flight", &self.locks.in_flight())
            .finish()
    }
}
