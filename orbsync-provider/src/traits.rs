//! Upstream provider trait.

use async_trait::async_trait;
use orbsync_core::{DatasetType, ProviderError, RecordSet, ScopeKey};

/// Boundary to the rate-limited upstream data provider.
///
/// One call fetches the full record set for a `(dataset, scope)` pair.
/// Implementations own endpoint fallback and authentication; a returned
/// error means every candidate endpoint was exhausted.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    async fn fetch(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> Result<RecordSet, ProviderError>;
}
