//! Query path construction with ordered endpoint fallback.
//!
//! Each dataset type maps to one or more `basicspacedata/query` paths,
//! tried in order. The fallbacks mirror the upstream's quirks: the latest
//! element sets live in `tle_latest` but the newer `gp` class answers when
//! that endpoint is having a bad day, and decay events have moved between
//! classes over the years.

use orbsync_core::{DatasetType, ScopeKey};

/// Default row limit for dataset-wide queries.
const CATALOG_LIMIT: u32 = 200;
const SUMMARY_LIMIT: u32 = 100;

/// Ordered candidate query paths for a `(dataset, scope)` pair.
///
/// Paths are relative to `{base_url}/basicspacedata/query/`.
pub fn candidate_queries(dataset_type: DatasetType, scope_key: &ScopeKey) -> Vec<String> {
    match (dataset_type, scope_key) {
        (DatasetType::Catalog, _) => vec![format!(
            "class/satcat/format/json/limit/{}",
            CATALOG_LIMIT
        )],
        (DatasetType::OrbitalElements, ScopeKey::Object(id)) => vec![
            format!(
                "class/tle_latest/format/json/orderby/EPOCH%20desc/limit/1/NORAD_CAT_ID/{}",
                id
            ),
            format!(
                "class/gp/format/json/orderby/EPOCH%20desc/limit/1/NORAD_CAT_ID/{}",
                id
            ),
        ],
        (DatasetType::OrbitalElements, ScopeKey::Global) => vec![
            format!(
                "class/tle_latest/format/json/orderby/EPOCH%20desc/limit/{}",
                CATALOG_LIMIT
            ),
            format!(
                "class/gp/format/json/orderby/EPOCH%20desc/limit/{}",
                CATALOG_LIMIT
            ),
        ],
        (DatasetType::PopulationSummary, _) => vec![format!(
            "class/boxscore/format/json/orderby/COUNTRY%20asc/limit/{}",
            SUMMARY_LIMIT
        )],
        // Conjunction messages are always pulled as a window; per-object
        // scoping is applied client-side because the CDM class keys on two
        // objects at once.
        (DatasetType::ConjunctionMessage, _) => {
            vec!["class/cdm/format/json/orderby/TCA%20asc".to_string()]
        }
        (DatasetType::LaunchSite, _) => vec![format!(
            "class/launch_site/format/json/orderby/SITE_CODE/limit/{}",
            SUMMARY_LIMIT
        )],
        (DatasetType::DecayEvent, _) => vec![
            format!(
                "class/decay/format/json/orderby/DECAY_EPOCH%20desc/limit/{}",
                SUMMARY_LIMIT
            ),
            format!(
                "class/reentry/format/json/orderby/REENTRY%20desc/limit/{}",
                SUMMARY_LIMIT
            ),
        ],
    }
}
