//! Refresh policy types.
//!
//! A `RefreshPolicy` says how often a dataset may be re-fetched from the
//! upstream provider and whether eligibility snaps to a time-of-day anchor.
//! Policies are loaded once at process start and are read-only thereafter.

use crate::dataset::{DatasetType, ScopeGranularity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Optional time-of-day anchor for refresh eligibility.
///
/// An anchored policy does not slide its window from the previous fetch
/// time. Eligibility snaps to the next occurrence of the anchor boundary,
/// which batches all anchored datasets together (the upstream publishes
/// daily products after a fixed UTC hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorRule {
    /// Eligible only at or after the given UTC time of day, once per day.
    DailyAfter { hour: u32, minute: u32 },
}

impl AnchorRule {
    /// The canonical daily publication boundary of the upstream provider.
    pub fn daily_after_17_utc() -> Self {
        AnchorRule::DailyAfter { hour: 17, minute: 0 }
    }
}

/// Refresh rule for one dataset type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshPolicy {
    pub dataset_type: DatasetType,
    /// Minimum spacing between upstream fetches for one scope.
    pub interval: Duration,
    /// Optional time-of-day boundary that eligibility snaps to.
    pub anchor_rule: Option<AnchorRule>,
    /// Whether the freshness clock is dataset-wide or per object.
    pub scope_granularity: ScopeGranularity,
}

impl RefreshPolicy {
    /// An unanchored sliding-window policy.
    pub fn sliding(
        dataset_type: DatasetType,
        interval: Duration,
        scope_granularity: ScopeGranularity,
    ) -> Self {
        Self {
            dataset_type,
            interval,
            anchor_rule: None,
            scope_granularity,
        }
    }

    /// A policy anchored to a daily UTC boundary.
    pub fn anchored_daily(
        dataset_type: DatasetType,
        interval: Duration,
        anchor: AnchorRule,
        scope_granularity: ScopeGranularity,
    ) -> Self {
        Self {
            dataset_type,
            interval,
            anchor_rule: Some(anchor),
            scope_granularity,
        }
    }

    /// Returns true when eligibility snaps to a time-of-day boundary.
    pub fn is_anchored(&self) -> bool {
        self.anchor_rule.is_some()
    }
}
