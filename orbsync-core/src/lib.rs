//! OrbSync Core - Entity Types
//!
//! Pure data structures with no behavior beyond validation and parsing.
//! All other crates depend on this. This crate contains ONLY data types -
//! no I/O, no business logic.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

pub mod config;
pub mod dataset;
pub mod elements;
pub mod entry;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod trajectory;

pub use config::{OrbSyncConfig, ProviderSettings};
pub use dataset::{DatasetType, DatasetTypeParseError, ScopeGranularity, ScopeKey};
pub use elements::OrbitalElementRecord;
pub use entry::{CacheEntry, FreshnessMeta, RecordSet};
pub use error::{
    ConfigError, OrbSyncError, OrbSyncResult, PolicyError, PropagationError, ProviderError,
    StoreError,
};
pub use outcome::{RefreshOutcome, SyncOutcome};
pub use policy::{AnchorRule, RefreshPolicy};
pub use trajectory::{TrajectoryMetrics, TrajectorySample};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Cache generation identifier using UUIDv7 for timestamp-sortable IDs.
pub type GenerationId = Uuid;

/// Generate a new UUIDv7 generation id (timestamp-sortable).
pub fn new_generation_id() -> GenerationId {
    Uuid::now_v7()
}

/// Epoch-zero instant used as the "never synchronized" sentinel.
///
/// A scope with no cache entry is treated as last synced at epoch zero,
/// which makes it immediately eligible under every policy.
pub fn epoch_zero() -> Timestamp {
    Utc.timestamp_opt(0, 0)
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC)
}
