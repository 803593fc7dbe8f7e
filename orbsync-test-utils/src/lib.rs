//! OrbSync Test Utilities
//!
//! Centralized test infrastructure for the OrbSync workspace:
//! - A scriptable mock upstream provider with a call counter
//! - Proptest generators for the core types
//! - Fixtures for common scenarios (ISS element set, catalog records)

// Re-export the in-memory store so test code only needs this crate
pub use orbsync_store::InMemoryCacheStore;

// Re-export core types for convenience
pub use orbsync_core::{
    AnchorRule, CacheEntry, DatasetType, FreshnessMeta, OrbSyncError, OrbSyncResult,
    OrbitalElementRecord, ProviderError, RecordSet, RefreshOutcome, RefreshPolicy,
    ScopeGranularity, ScopeKey, SyncOutcome, Timestamp,
};

use async_trait::async_trait;
use orbsync_provider::UpstreamProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// ============================================================================
// MOCK UPSTREAM PROVIDER
// ============================================================================

/// Scriptable upstream provider for testing.
///
/// Serves canned record sets keyed by `(dataset_type, scope_key)` and counts
/// every fetch, so tests can assert on exactly how many upstream calls a
/// code path issued. An injected failure makes every fetch fail until
/// cleared.
#[derive(Debug, Default)]
pub struct MockUpstreamProvider {
    responses: Mutex<HashMap<(DatasetType, ScopeKey), Vec<serde_json::Value>>>,
    failure: Mutex<Option<ProviderError>>,
    fetch_calls: AtomicU64,
}

impl MockUpstreamProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the records returned for a `(dataset, scope)` pair.
    pub fn set_response(
        &self,
        dataset_type: DatasetType,
        scope_key: ScopeKey,
        records: Vec<serde_json::Value>,
    ) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((dataset_type, scope_key), records);
    }

    /// Make every subsequent fetch fail with the given error.
    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    /// Clear an injected failure.
    pub fn recover(&self) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Total number of `fetch` calls issued so far.
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.fetch_calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl UpstreamProvider for MockUpstreamProvider {
    async fn fetch(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> Result<RecordSet, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(error);
        }

        let records = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(dataset_type, scope_key.clone()))
            .cloned()
            .unwrap_or_default();
        Ok(RecordSet::new(dataset_type, records))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating OrbSync core types.

    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    /// Generate a dataset type.
    pub fn arb_dataset_type() -> impl Strategy<Value = DatasetType> {
        prop_oneof![
            Just(DatasetType::Catalog),
            Just(DatasetType::OrbitalElements),
            Just(DatasetType::PopulationSummary),
            Just(DatasetType::ConjunctionMessage),
            Just(DatasetType::LaunchSite),
            Just(DatasetType::DecayEvent),
        ]
    }

    /// Generate a scope key: global or a numeric object id.
    pub fn arb_scope_key() -> impl Strategy<Value = ScopeKey> {
        prop_oneof![
            Just(ScopeKey::Global),
            (1u32..999_999).prop_map(|id| ScopeKey::object(id.to_string())),
        ]
    }

    /// Generate a Timestamp within 2020-2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(chrono::Utc::now)
        })
    }

    /// Generate a sliding-window policy with an interval between one minute
    /// and one week.
    pub fn arb_sliding_policy() -> impl Strategy<Value = RefreshPolicy> {
        (arb_dataset_type(), 60u64..604_800).prop_map(|(dataset_type, secs)| {
            RefreshPolicy::sliding(
                dataset_type,
                Duration::from_secs(secs),
                ScopeGranularity::Global,
            )
        })
    }

    /// Generate a daily-anchored policy with a random anchor time.
    pub fn arb_anchored_policy() -> impl Strategy<Value = RefreshPolicy> {
        (arb_dataset_type(), 0u32..24, 0u32..60).prop_map(|(dataset_type, hour, minute)| {
            RefreshPolicy::anchored_daily(
                dataset_type,
                Duration::from_secs(86_400),
                AnchorRule::DailyAfter { hour, minute },
                ScopeGranularity::Global,
            )
        })
    }

    /// Generate either flavor of policy.
    pub fn arb_policy() -> impl Strategy<Value = RefreshPolicy> {
        prop_oneof![arb_sliding_policy(), arb_anchored_policy()]
    }

    /// Generate a physically plausible orbital element record.
    pub fn arb_element_record() -> impl Strategy<Value = OrbitalElementRecord> {
        (
            1u32..999_999,
            arb_timestamp(),
            1.0f64..16.5,
            0.0f64..0.7,
            0.0f64..180.0,
            0.0f64..360.0,
            0.0f64..360.0,
            0.0f64..360.0,
        )
            .prop_map(
                |(id, epoch, mean_motion, eccentricity, inclination, raan, argp, ma)| {
                    OrbitalElementRecord {
                        object_id: id.to_string(),
                        epoch,
                        mean_motion,
                        eccentricity,
                        inclination,
                        raan,
                        arg_perigee: argp,
                        mean_anomaly: ma,
                        bstar: 0.0001,
                    }
                },
            )
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Canned records for common test scenarios.

    use super::*;
    use serde_json::json;

    /// The ISS element set as upstream serializes it (string numerics).
    pub fn iss_gp_record() -> serde_json::Value {
        json!({
            "NORAD_CAT_ID": "25544",
            "OBJECT_NAME": "ISS (ZARYA)",
            "EPOCH": "2024-03-01 12:00:00.000000",
            "MEAN_MOTION": "15.50103472",
            "ECCENTRICITY": "0.0004263",
            "INCLINATION": "51.6405",
            "RA_OF_ASC_NODE": "120.47",
            "ARG_OF_PERICENTER": "80.01",
            "MEAN_ANOMALY": "30.55",
            "BSTAR": "0.00023"
        })
    }

    /// The parsed counterpart of [`iss_gp_record`].
    pub fn iss_elements() -> OrbitalElementRecord {
        OrbitalElementRecord {
            object_id: "25544".to_string(),
            epoch: "2024-03-01T12:00:00Z"
                .parse()
                .unwrap_or_else(|_| chrono::Utc::now()),
            mean_motion: 15.50103472,
            eccentricity: 0.0004263,
            inclination: 51.6405,
            raan: 120.47,
            arg_perigee: 80.01,
            mean_anomaly: 30.55,
            bstar: 0.00023,
        }
    }

    /// A small satellite catalog slice.
    pub fn catalog_records() -> Vec<serde_json::Value> {
        vec![
            json!({"NORAD_CAT_ID": "25544", "OBJECT_NAME": "ISS (ZARYA)", "COUNTRY": "ISS", "OBJECT_TYPE": "PAYLOAD"}),
            json!({"NORAD_CAT_ID": "20580", "OBJECT_NAME": "HST", "COUNTRY": "US", "OBJECT_TYPE": "PAYLOAD"}),
            json!({"NORAD_CAT_ID": "43013", "OBJECT_NAME": "COSMOS 2521", "COUNTRY": "CIS", "OBJECT_TYPE": "PAYLOAD"}),
        ]
    }

    /// Two conjunction messages involving the ISS and one unrelated pair.
    pub fn conjunction_records() -> Vec<serde_json::Value> {
        vec![
            json!({"CDM_ID": "1001", "OBJECT1_NORAD_CAT_ID": "25544", "OBJECT2_NORAD_CAT_ID": "43013", "MIN_RNG": "1.2"}),
            json!({"CDM_ID": "1002", "OBJECT1_NORAD_CAT_ID": "20580", "OBJECT2_NORAD_CAT_ID": "43013", "MIN_RNG": "4.5"}),
            json!({"CDM_ID": "1003", "OBJECT1_NORAD_CAT_ID": "43013", "OBJECT2_NORAD_CAT_ID": "25544", "MIN_RNG": "0.8"}),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_counts_and_scripts() {
        let provider = MockUpstreamProvider::new();
        provider.set_response(
            DatasetType::Catalog,
            ScopeKey::Global,
            fixtures::catalog_records(),
        );

        let set = provider
            .fetch(DatasetType::Catalog, &ScopeKey::Global)
            .await
            .unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(provider.fetch_calls(), 1);

        let empty = provider
            .fetch(DatasetType::LaunchSite, &ScopeKey::Global)
            .await
            .unwrap();
        assert!(empty.is_empty());
        assert_eq!(provider.fetch_calls(), 2);
    }
}
