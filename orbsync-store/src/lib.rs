//! OrbSync cache storage layer.
//!
//! Durable keyed storage of the latest known record set per
//! `(DatasetType, ScopeKey)` scope, plus the transient keyed lock table
//! that guarantees at most one in-flight upstream fetch per scope.
//!
//! # Atomicity
//!
//! An upsert replaces the whole cache entry for a scope under a single
//! write lock. A concurrent reader observes either the fully-old or the
//! fully-new generation, never a partial record set.
//!
//! # Eviction
//!
//! Entries are never deleted by this layer; retention is an external
//! policy.

pub mod lock;
pub mod memory;
pub mod traits;

pub use lock::{SyncLockGuard, SyncLockTable};
pub use memory::InMemoryCacheStore;
pub use traits::{CacheStats, CacheStore};
