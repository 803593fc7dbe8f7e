//! Freshness policy registry.
//!
//! A static table of refresh rules per dataset type, loaded once at process
//! start and read-only thereafter. Conjunction messages carry two coexisting
//! windows - a dataset-wide sweep and a tighter per-object override - and the
//! stricter applicable window governs a given scope.

use once_cell::sync::Lazy;
use orbsync_core::{
    AnchorRule, DatasetType, PolicyError, RefreshPolicy, ScopeGranularity, ScopeKey,
};
use std::collections::HashMap;
use std::time::Duration;

const HOUR: Duration = Duration::from_secs(3_600);
const DAY: Duration = Duration::from_secs(86_400);

static BUILTIN: Lazy<PolicyRegistry> = Lazy::new(|| {
    let anchor = AnchorRule::daily_after_17_utc();
    PolicyRegistry::new(vec![
        // Daily products published by the upstream after 17:00 UTC.
        RefreshPolicy::anchored_daily(DatasetType::Catalog, DAY, anchor, ScopeGranularity::Global),
        RefreshPolicy::anchored_daily(
            DatasetType::PopulationSummary,
            DAY,
            anchor,
            ScopeGranularity::Global,
        ),
        RefreshPolicy::anchored_daily(
            DatasetType::LaunchSite,
            DAY,
            anchor,
            ScopeGranularity::Global,
        ),
        RefreshPolicy::anchored_daily(
            DatasetType::DecayEvent,
            DAY,
            anchor,
            ScopeGranularity::Global,
        ),
        // Element sets refresh on independent per-object clocks.
        RefreshPolicy::sliding(DatasetType::OrbitalElements, HOUR, ScopeGranularity::PerObject),
        // Conjunction sweep for the whole dataset, three times a day.
        RefreshPolicy::sliding(
            DatasetType::ConjunctionMessage,
            Duration::from_secs(8 * 3_600),
            ScopeGranularity::Global,
        ),
    ])
    .with_object_override(RefreshPolicy::sliding(
        DatasetType::ConjunctionMessage,
        HOUR,
        ScopeGranularity::PerObject,
    ))
});

/// Lookup table from dataset type to refresh policy.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    base: HashMap<DatasetType, RefreshPolicy>,
    object_overrides: HashMap<DatasetType, RefreshPolicy>,
}

impl PolicyRegistry {
    /// Build a registry from base policies, keyed by their dataset type.
    pub fn new(policies: Vec<RefreshPolicy>) -> Self {
        Self {
            base: policies
                .into_iter()
                .map(|p| (p.dataset_type, p))
                .collect(),
            object_overrides: HashMap::new(),
        }
    }

    /// Register a per-object window that overrides the base policy for
    /// object scopes of its dataset type. The override is expected to be
    /// the stricter (more frequent) of the two.
    pub fn with_object_override(mut self, policy: RefreshPolicy) -> Self {
        self.object_overrides.insert(policy.dataset_type, policy);
        self
    }

    /// The built-in production table.
    pub fn builtin() -> &'static PolicyRegistry {
        &BUILTIN
    }

    /// Base policy lookup. Pure, no side effects, no I/O.
    pub fn policy_for(&self, dataset_type: DatasetType) -> Result<&RefreshPolicy, PolicyError> {
        self.base
            .get(&dataset_type)
            .ok_or(PolicyError::UnknownDatasetType { dataset_type })
    }

    /// The policy governing a specific scope: the per-object override when
    /// one is registered and the scope names an object, otherwise the base.
    pub fn effective_policy(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> Result<&RefreshPolicy, PolicyError> {
        if let ScopeKey::Object(_) = scope_key {
            if let Some(override_policy) = self.object_overrides.get(&dataset_type) {
                return Ok(override_policy);
            }
        }
        self.policy_for(dataset_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_dataset_type() {
        let registry = PolicyRegistry::builtin();
        for dataset in DatasetType::ALL {
            assert!(registry.policy_for(dataset).is_ok(), "{} missing", dataset);
        }
    }

    #[test]
    fn test_unknown_dataset_type_fails() {
        let registry = PolicyRegistry::new(vec![RefreshPolicy::sliding(
            DatasetType::Catalog,
            DAY,
            ScopeGranularity::Global,
        )]);
        let err = registry
            .policy_for(DatasetType::OrbitalElements)
            .unwrap_err();
        assert_eq!(
            err,
            PolicyError::UnknownDatasetType {
                dataset_type: DatasetType::OrbitalElements
            }
        );
    }

    #[test]
    fn test_daily_datasets_are_anchored() {
        let registry = PolicyRegistry::builtin();
        for dataset in [
            DatasetType::Catalog,
            DatasetType::PopulationSummary,
            DatasetType::LaunchSite,
            DatasetType::DecayEvent,
        ] {
            let policy = registry.policy_for(dataset).unwrap();
            assert!(policy.is_anchored());
            assert_eq!(policy.scope_granularity, ScopeGranularity::Global);
        }
    }

    #[test]
    fn test_conjunction_object_scope_gets_stricter_window() {
        let registry = PolicyRegistry::builtin();

        let global = registry
            .effective_policy(DatasetType::ConjunctionMessage, &ScopeKey::Global)
            .unwrap();
        assert_eq!(global.interval, Duration::from_secs(8 * 3_600));

        let scoped = registry
            .effective_policy(
                DatasetType::ConjunctionMessage,
                &ScopeKey::object("25544"),
            )
            .unwrap();
        assert_eq!(scoped.interval, HOUR);
        assert!(scoped.interval < global.interval);
    }

    #[test]
    fn test_override_absent_falls_back_to_base() {
        let registry = PolicyRegistry::builtin();
        let policy = registry
            .effective_policy(DatasetType::OrbitalElements, &ScopeKey::object("25544"))
            .unwrap();
        assert_eq!(policy.interval, HOUR);
        assert_eq!(policy.scope_granularity, ScopeGranularity::PerObject);
    }
}
