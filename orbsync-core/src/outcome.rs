//! Sync and refresh outcome types.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// Outcome of a sync orchestrator `ensure_fresh` invocation.
///
/// Every variant except `RefreshFailed` is the expected, recoverable kind;
/// none of them is an error in the `Result` sense. The prior cached payload
/// remains the system's answer in all non-`Refreshed` cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    /// The cache is inside its eligibility window; no upstream call was made.
    AlreadyFresh,
    /// An upstream fetch succeeded and a new cache generation was committed.
    Refreshed,
    /// Another fetch for the same scope was in flight; this caller did not
    /// wait and no upstream call was made.
    RefreshSkippedLocked,
    /// All candidate endpoints were exhausted; the prior cache entry is
    /// untouched and stale-but-available.
    RefreshFailed { reason: String },
}

impl SyncOutcome {
    /// Whether this outcome committed a new cache generation.
    pub fn refreshed(&self) -> bool {
        matches!(self, SyncOutcome::Refreshed)
    }
}

/// Outcome of a user-initiated `request_refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshOutcome {
    /// The policy window has not opened yet; no upstream call was made.
    /// User-visible and expected - not logged as an error.
    NotEligible { next_eligible: Timestamp },
    /// The window was open; carries the orchestrator's outcome.
    Attempted(SyncOutcome),
}
