//! Cache entry and freshness metadata types.
//!
//! A `CacheEntry` is the last-known-good record set for one
//! `(DatasetType, ScopeKey)` scope, tagged with the timestamp of the fetch
//! that produced it. Entries are created on first successful fetch and
//! replaced whole on subsequent fetches; readers observe either the old
//! generation or the new one, never a mix.

use crate::dataset::{DatasetType, ScopeKey};
use crate::{new_generation_id, GenerationId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered set of upstream records plus the field that carries their
/// natural key. Opaque to the sync layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    /// Raw records as returned by the upstream provider.
    pub records: Vec<Value>,
    /// Field name holding the dataset's natural identifier.
    pub key_field: String,
}

impl RecordSet {
    /// Build a record set for a dataset, using its natural key field.
    pub fn new(dataset_type: DatasetType, records: Vec<Value>) -> Self {
        Self {
            records,
            key_field: dataset_type.natural_key_field().to_string(),
        }
    }

    /// The empty sentinel returned for never-fetched scopes.
    pub fn empty(dataset_type: DatasetType) -> Self {
        Self::new(dataset_type, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Find a record by its natural key value.
    pub fn find(&self, key: &str) -> Option<&Value> {
        self.records.iter().find(|record| {
            record
                .get(&self.key_field)
                .and_then(Value::as_str)
                .map(|v| v == key)
                .unwrap_or(false)
        })
    }
}

/// The latest known record set for one scope, with sync provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub dataset_type: DatasetType,
    pub scope_key: ScopeKey,
    pub payload: RecordSet,
    /// When the sync orchestrator last committed an upstream fetch for this
    /// scope. Monotonically non-decreasing; never written by reads.
    pub last_synced_at: Timestamp,
    /// Identifier of the fetch generation that produced this payload.
    pub source_generation: GenerationId,
}

impl CacheEntry {
    /// Build a fresh entry for a just-completed fetch.
    pub fn new_generation(
        dataset_type: DatasetType,
        scope_key: ScopeKey,
        payload: RecordSet,
        synced_at: Timestamp,
    ) -> Self {
        Self {
            dataset_type,
            scope_key,
            payload,
            last_synced_at: synced_at,
            source_generation: new_generation_id(),
        }
    }
}

/// Freshness metadata surfaced to consumers alongside every read.
///
/// Always present, even when the payload is the empty sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessMeta {
    /// Last successful sync, or None if the scope was never fetched.
    pub last_synced_at: Option<Timestamp>,
    /// Earliest instant at which a refresh is permitted.
    pub next_eligible: Timestamp,
}

impl FreshnessMeta {
    /// Whether a refresh would be permitted at `now`.
    pub fn is_eligible_at(&self, now: Timestamp) -> bool {
        now >= self.next_eligible
    }
}
