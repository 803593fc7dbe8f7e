//! Read mediator: the only path consumers use to obtain data.
//!
//! Reads always return cache content plus freshness metadata and never
//! block on network I/O. A user-initiated refresh is gated by the policy
//! window and rejected with a structured reason when early. Derived
//! trajectories are partial-success: the raw payload is always returned
//! even when propagation fails.

use crate::eligibility::freshness_meta;
use crate::orchestrator::SyncOrchestrator;
use chrono::Utc;
use orbsync_core::{
    DatasetType, FreshnessMeta, OrbSyncResult, OrbitalElementRecord, PropagationError, RecordSet,
    RefreshOutcome, ScopeKey, Timestamp, TrajectorySample,
};
use orbsync_provider::UpstreamProvider;
use orbsync_store::CacheStore;
use std::sync::Arc;

/// Consumer-facing read/refresh surface.
pub struct ReadMediator<S, P> {
    orchestrator: Arc<SyncOrchestrator<S, P>>,
}

impl<S, P> std::fmt::Debug for ReadMediator<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadMediator")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

impl<S, P> Clone for ReadMediator<S, P> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

/// A read with an attached derived trajectory.
///
/// The payload and freshness metadata are always present; the trajectory is
/// nullable with the propagation error attached, so a propagation failure
/// never takes down the read path.
#[derive(Debug, Clone)]
pub struct TrajectoryRead {
    pub payload: RecordSet,
    pub freshness: FreshnessMeta,
    pub trajectory: Result<Vec<TrajectorySample>, PropagationError>,
}

impl<S, P> ReadMediator<S, P>
where
    S: CacheStore + Send + Sync + 'static,
    P: UpstreamProvider + Send + Sync + 'static,
{
    pub fn new(orchestrator: Arc<SyncOrchestrator<S, P>>) -> Self {
        Self { orchestrator }
    }

    /// Cache read: payload (possibly the empty sentinel) plus freshness
    /// metadata. Triggers no upstream call.
    ///
    /// Payload and metadata come from one store read, so the metadata
    /// always describes the generation the consumer received even when a
    /// refresh commits concurrently.
    pub async fn read(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<(RecordSet, FreshnessMeta)> {
        let policy = self
            .orchestrator
            .registry()
            .effective_policy(dataset_type, scope_key)?;
        let entry = self.orchestrator.entry(dataset_type, scope_key).await?;
        let freshness = freshness_meta(entry.as_ref(), policy);
        let payload = entry
            .map(|e| e.payload)
            .unwrap_or_else(|| RecordSet::empty(dataset_type));
        Ok((payload, freshness))
    }

    /// `read`, plus a fire-and-forget background `ensure_fresh`.
    ///
    /// The trigger cannot block or alter the payload returned by this call;
    /// a refresh it commits is visible to subsequent reads only.
    pub async fn read_and_revalidate(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<(RecordSet, FreshnessMeta)> {
        let result = self.read(dataset_type, scope_key).await?;

        let orchestrator = Arc::clone(&self.orchestrator);
        let scope = scope_key.clone();
        tokio::spawn(async move {
            if let Err(err) = orchestrator.ensure_fresh(dataset_type, &scope).await {
                tracing::warn!(
                    dataset = %dataset_type,
                    scope = %scope,
                    error = %err,
                    "background revalidation failed"
                );
            }
        });

        Ok(result)
    }

    /// User-initiated refresh, gated by the policy window.
    pub async fn request_refresh(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> OrbSyncResult<RefreshOutcome> {
        self.request_refresh_at(dataset_type, scope_key, Utc::now())
            .await
    }

    /// `request_refresh` against an explicit clock.
    pub async fn request_refresh_at(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
        now: Timestamp,
    ) -> OrbSyncResult<RefreshOutcome> {
        let freshness = self.orchestrator.freshness(dataset_type, scope_key).await?;
        if now < freshness.next_eligible {
            // The explicit compliance gate surfaced to end users; expected,
            // not logged as an error.
            return Ok(RefreshOutcome::NotEligible {
                next_eligible: freshness.next_eligible,
            });
        }

        let outcome = self
            .orchestrator
            .ensure_fresh_at(dataset_type, scope_key, now)
            .await?;
        Ok(RefreshOutcome::Attempted(outcome))
    }

    /// Read the cached element set for an object and derive a trajectory
    /// over the given instants. Partial success: raw payload always comes
    /// back; the trajectory may carry an error instead.
    pub async fn read_with_trajectory(
        &self,
        object_id: &str,
        timestamps: &[Timestamp],
        horizon_days: i64,
    ) -> OrbSyncResult<TrajectoryRead> {
        let scope = ScopeKey::object(object_id);
        let (payload, freshness) = self.read(DatasetType::OrbitalElements, &scope).await?;

        let trajectory = derive_trajectory(object_id, &payload, timestamps, horizon_days);
        if let Err(err) = &trajectory {
            tracing::debug!(object = object_id, error = %err, "trajectory derivation failed");
        }

        Ok(TrajectoryRead {
            payload,
            freshness,
            trajectory,
        })
    }
}

fn derive_trajectory(
    object_id: &str,
    payload: &RecordSet,
    timestamps: &[Timestamp],
    horizon_days: i64,
) -> Result<Vec<TrajectorySample>, PropagationError> {
    let record = payload
        .records
        .first()
        .ok_or_else(|| PropagationError::InvalidElementSet {
            object_id: object_id.to_string(),
            reason: "no cached element set for object".to_string(),
        })?;
    let elements = OrbitalElementRecord::from_gp_record(record)?;
    orbsync_orbit::propagate_all(&elements, timestamps, horizon_days)
}
