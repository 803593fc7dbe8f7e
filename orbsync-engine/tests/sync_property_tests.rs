//! Property-Based Tests for the Sync Engine
//!
//! **Property 1: Compliance**
//!
//! For any policy, `last_synced_at`, and clock strictly before
//! `next_eligible`, `ensure_fresh` SHALL issue zero upstream calls.
//!
//! **Property 2: Single-Flight**
//!
//! For any number of concurrent `ensure_fresh` invocations on the same
//! `(dataset_type, scope_key)`, at most one SHALL reach the upstream;
//! the rest observe `RefreshSkippedLocked` or the just-committed result.

use chrono::{Duration, TimeZone, Utc};
use orbsync_engine::{next_eligible, PolicyRegistry, SyncOrchestrator};
use orbsync_store::CacheStore;
use orbsync_test_utils::generators::{arb_policy, arb_timestamp};
use orbsync_test_utils::{
    CacheEntry, DatasetType, InMemoryCacheStore, MockUpstreamProvider, RecordSet, ScopeKey,
    SyncOutcome,
};
use proptest::prelude::*;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn test_runtime() -> Result<Runtime, TestCaseError> {
    Runtime::new().map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))
}

fn orchestrator_with(
    registry: PolicyRegistry,
) -> (
    Arc<SyncOrchestrator<InMemoryCacheStore, MockUpstreamProvider>>,
    Arc<MockUpstreamProvider>,
) {
    let store = Arc::new(InMemoryCacheStore::new());
    let provider = Arc::new(MockUpstreamProvider::new());
    let orchestrator = Arc::new(SyncOrchestrator::new(
        registry,
        store,
        Arc::clone(&provider),
    ));
    (orchestrator, provider)
}

proptest! {
    #[test]
    fn prop_no_upstream_call_before_window_opens(
        policy in arb_policy(),
        last in arb_timestamp(),
        early_secs in 1i64..86_400,
    ) {
        let rt = test_runtime()?;
        let dataset = policy.dataset_type;
        let scope = ScopeKey::Global;

        let window_opens = next_eligible(Some(last), &policy);
        let now = window_opens - Duration::seconds(early_secs);
        // An early clock that precedes the last sync is outside the model.
        prop_assume!(now >= last);

        let (orchestrator, provider) = orchestrator_with(PolicyRegistry::new(vec![policy]));
        rt.block_on(async {
            orchestrator
                .store()
                .upsert(CacheEntry::new_generation(
                    dataset,
                    scope.clone(),
                    RecordSet::empty(dataset),
                    last,
                ))
                .await
                .unwrap();

            let outcome = orchestrator
                .ensure_fresh_at(dataset, &scope, now)
                .await
                .unwrap();
            assert_eq!(outcome, SyncOutcome::AlreadyFresh);
        });

        prop_assert_eq!(provider.fetch_calls(), 0);
    }

    #[test]
    fn prop_open_window_fetches_exactly_once(
        policy in arb_policy(),
        last in arb_timestamp(),
        late_secs in 0i64..86_400,
    ) {
        let rt = test_runtime()?;
        let dataset = policy.dataset_type;
        let scope = ScopeKey::Global;
        let now = next_eligible(Some(last), &policy) + Duration::seconds(late_secs);

        let (orchestrator, provider) = orchestrator_with(PolicyRegistry::new(vec![policy]));
        rt.block_on(async {
            orchestrator
                .store()
                .upsert(CacheEntry::new_generation(
                    dataset,
                    scope.clone(),
                    RecordSet::empty(dataset),
                    last,
                ))
                .await
                .unwrap();

            let outcome = orchestrator
                .ensure_fresh_at(dataset, &scope, now)
                .await
                .unwrap();
            assert_eq!(outcome, SyncOutcome::Refreshed);

            // The committed sync time restarts the window.
            let second = orchestrator
                .ensure_fresh_at(dataset, &scope, now)
                .await
                .unwrap();
            assert_eq!(second, SyncOutcome::AlreadyFresh);
        });

        prop_assert_eq!(provider.fetch_calls(), 1);
    }

    #[test]
    fn prop_never_synced_scope_is_immediately_eligible(policy in arb_policy(), now in arb_timestamp()) {
        let rt = test_runtime()?;
        let dataset = policy.dataset_type;
        let (orchestrator, provider) = orchestrator_with(PolicyRegistry::new(vec![policy]));

        let outcome = rt.block_on(orchestrator.ensure_fresh_at(dataset, &ScopeKey::Global, now));
        prop_assert_eq!(outcome.unwrap(), SyncOutcome::Refreshed);
        prop_assert_eq!(provider.fetch_calls(), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ensure_fresh_single_upstream_call() {
    let (orchestrator, provider) = orchestrator_with(PolicyRegistry::builtin().clone());
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let scope = ScopeKey::object("25544");

    let mut handles = Vec::new();
    for _ in 0..16 {
        let orchestrator = Arc::clone(&orchestrator);
        let scope = scope.clone();
        handles.push(tokio::spawn(async move {
            orchestrator
                .ensure_fresh_at(DatasetType::OrbitalElements, &scope, now)
                .await
                .unwrap()
        }));
    }

    let mut refreshed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            SyncOutcome::Refreshed => refreshed += 1,
            SyncOutcome::RefreshSkippedLocked | SyncOutcome::AlreadyFresh => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(refreshed, 1, "exactly one caller performs the fetch");
    assert_eq!(provider.fetch_calls(), 1);
}

#[tokio::test]
async fn test_failed_fetch_leaves_cache_untouched() {
    let (orchestrator, provider) = orchestrator_with(PolicyRegistry::builtin().clone());
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let scope = ScopeKey::object("25544");
    let dataset = DatasetType::OrbitalElements;

    provider.set_response(
        dataset,
        scope.clone(),
        vec![orbsync_test_utils::fixtures::iss_gp_record()],
    );
    let first = orchestrator.ensure_fresh_at(dataset, &scope, t0).await.unwrap();
    assert_eq!(first, SyncOutcome::Refreshed);

    provider.fail_with(orbsync_test_utils::ProviderError::AllEndpointsExhausted {
        dataset_type: dataset,
        attempted: 2,
        last_error: "HTTP 500".to_string(),
    });

    let later = t0 + Duration::hours(2);
    let outcome = orchestrator.ensure_fresh_at(dataset, &scope, later).await.unwrap();
    assert!(matches!(outcome, SyncOutcome::RefreshFailed { .. }));

    // Stale-but-available: the previous generation still serves reads.
    let freshness = orchestrator.freshness(dataset, &scope).await.unwrap();
    assert_eq!(freshness.last_synced_at, Some(t0));

    // Recovery on the next window.
    provider.recover();
    let recovered = orchestrator
        .ensure_fresh_at(dataset, &scope, later + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(recovered, SyncOutcome::Refreshed);
}

#[tokio::test]
async fn test_refreshed_payload_replaces_whole_generation() {
    let (orchestrator, provider) = orchestrator_with(PolicyRegistry::builtin().clone());
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let scope = ScopeKey::Global;
    let dataset = DatasetType::Catalog;

    provider.set_response(dataset, scope.clone(), orbsync_test_utils::fixtures::catalog_records());
    orchestrator.ensure_fresh_at(dataset, &scope, t0).await.unwrap();

    provider.set_response(
        dataset,
        scope.clone(),
        vec![serde_json::json!({"NORAD_CAT_ID": "20580", "OBJECT_NAME": "HST"})],
    );
    let next_day = t0 + Duration::days(1);
    orchestrator.ensure_fresh_at(dataset, &scope, next_day).await.unwrap();

    let entry = orchestrator
        .store()
        .get(dataset, &scope)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.payload.len(), 1, "old generation fully replaced");
    assert!(entry.payload.find("20580").is_some());
    assert!(entry.payload.find("25544").is_none());
}

/// Anchored batching: a daily dataset fetched at 18:00 is eligible again at
/// 17:00 the next day, together with every other daily dataset.
#[tokio::test]
async fn test_anchored_daily_dataset_batches_at_boundary() {
    let (orchestrator, provider) = orchestrator_with(PolicyRegistry::builtin().clone());
    let scope = ScopeKey::Global;
    let dataset = DatasetType::Catalog;

    let fetched = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
    orchestrator.ensure_fresh_at(dataset, &scope, fetched).await.unwrap();
    assert_eq!(provider.fetch_calls(), 1);

    // 16:59 next day: window still closed.
    let before_boundary = Utc.with_ymd_and_hms(2024, 3, 2, 16, 59, 0).unwrap();
    let outcome = orchestrator
        .ensure_fresh_at(dataset, &scope, before_boundary)
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::AlreadyFresh);
    assert_eq!(provider.fetch_calls(), 1);

    // 17:00 sharp: eligible.
    let boundary = Utc.with_ymd_and_hms(2024, 3, 2, 17, 0, 0).unwrap();
    let outcome = orchestrator
        .ensure_fresh_at(dataset, &scope, boundary)
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Refreshed);
    assert_eq!(provider.fetch_calls(), 2);
}
