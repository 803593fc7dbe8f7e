//! Eligibility window calculation.
//!
//! Pure functions of `(last_synced_at, policy)`. No clock reads, no I/O:
//! callers pass `now` explicitly, which keeps the compliance invariant
//! testable over arbitrary synthetic clocks.

use chrono::{Duration as ChronoDuration, Timelike};
use orbsync_core::{epoch_zero, AnchorRule, CacheEntry, FreshnessMeta, RefreshPolicy, Timestamp};

/// Earliest instant at which a refresh is permitted for a scope.
///
/// A scope that was never fetched (`last_synced_at` = None) is treated as
/// synced at epoch zero and is immediately eligible under every policy.
///
/// Unanchored policies slide: `last + interval`. Anchored policies snap to
/// the anchor's time-of-day boundary instead: the window opens at the first
/// anchor occurrence strictly after the last sync (stepped by whole anchor
/// periods when the interval spans several days). This produces batching -
/// every daily dataset becomes eligible together at the anchor hour
/// regardless of exactly when its previous fetch ran.
pub fn next_eligible(last_synced_at: Option<Timestamp>, policy: &RefreshPolicy) -> Timestamp {
    let last = match last_synced_at {
        None => return epoch_zero(),
        Some(t) => t,
    };

    match policy.anchor_rule {
        None => last + to_chrono(policy.interval),
        Some(AnchorRule::DailyAfter { hour, minute }) => {
            let hour = hour.min(23);
            let minute = minute.min(59);

            // Ceil of interval in whole anchor periods (days), at least one.
            let periods = (policy.interval.as_secs().div_ceil(86_400)).max(1) as i64;

            let anchor_on_last_day = last
                .with_hour(hour)
                .and_then(|t| t.with_minute(minute))
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(last);

            let first_after = if anchor_on_last_day > last {
                anchor_on_last_day
            } else {
                anchor_on_last_day + ChronoDuration::days(1)
            };

            first_after + ChronoDuration::days(periods - 1)
        }
    }
}

/// Freshness metadata for a (possibly absent) cache entry under a policy.
pub fn freshness_meta(entry: Option<&CacheEntry>, policy: &RefreshPolicy) -> FreshnessMeta {
    let last_synced_at = entry.map(|e| e.last_synced_at);
    FreshnessMeta {
        last_synced_at,
        next_eligible: next_eligible(last_synced_at, policy),
    }
}

fn to_chrono(d: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or(ChronoDuration::MAX)
}
