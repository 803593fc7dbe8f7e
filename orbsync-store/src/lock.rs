//! Keyed sync-lock table.
//!
//! A transient per-`(DatasetType, ScopeKey)` marker for an in-flight
//! upstream fetch. Acquisition never blocks: a caller either takes the lock
//! or learns immediately that another fetch holds it. The guard releases on
//! drop, including on the failure path, so locks cannot leak past the fetch
//! that created them.
//!
//! A keyed table rather than one global lock preserves cross-scope
//! parallelism: two scopes under the same dataset type fetch independently.

use orbsync_core::{DatasetType, ScopeKey};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

type LockKey = (DatasetType, ScopeKey);

/// Table of currently held per-scope sync locks.
#[derive(Debug, Clone, Default)]
pub struct SyncLockTable {
    held: Arc<Mutex<HashSet<LockKey>>>,
}

impl SyncLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take the lock for a scope without waiting.
    ///
    /// Returns None when another fetch already holds it.
    pub fn try_acquire(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> Option<SyncLockGuard> {
        let key = (dataset_type, scope_key.clone());
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        if held.insert(key.clone()) {
            Some(SyncLockGuard {
                table: Arc::clone(&self.held),
                key,
            })
        } else {
            None
        }
    }

    /// Whether the lock for a scope is currently held.
    pub fn is_held(&self, dataset_type: DatasetType, scope_key: &ScopeKey) -> bool {
        let held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        held.contains(&(dataset_type, scope_key.clone()))
    }

    /// Number of in-flight fetches.
    pub fn in_flight(&self) -> usize {
        let held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        held.len()
    }

    /// Drop every held marker.
    ///
    /// The in-memory table cannot survive a crash, so this exists for
    /// durable-store integrations that sweep stale markers at startup.
    pub fn clear(&self) {
        let mut held = self.held.lock().unwrap_or_else(|e| e.into_inner());
        held.clear();
    }
}

/// RAII guard for a held sync lock; releases on drop.
#[derive(Debug)]
pub struct SyncLockGuard {
    table: Arc<Mutex<HashSet<LockKey>>>,
    key: LockKey,
}

impl Drop for SyncLockGuard {
    fn drop(&mut self) {
        let mut held = self.table.lock().unwrap_or_else(|e| e.into_inner());
        held.remove(&self.key);
    }
}
