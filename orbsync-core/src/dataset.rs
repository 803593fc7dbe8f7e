//! Dataset type and scope key discriminators.
//!
//! A `DatasetType` names one upstream data category with its own refresh
//! policy. A `ScopeKey` names the unit of freshness tracking inside that
//! category: the dataset-wide sentinel or a single tracked object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream dataset category, defined at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetType {
    /// Full satellite catalog (satcat).
    Catalog,
    /// Latest orbital element sets per object.
    OrbitalElements,
    /// Object population summary by country (boxscore).
    PopulationSummary,
    /// Conjunction data messages (CDM).
    ConjunctionMessage,
    /// Launch site registry.
    LaunchSite,
    /// Atmospheric re-entry events.
    DecayEvent,
}

impl DatasetType {
    /// All dataset types, in registry order.
    pub const ALL: [DatasetType; 6] = [
        DatasetType::Catalog,
        DatasetType::OrbitalElements,
        DatasetType::PopulationSummary,
        DatasetType::ConjunctionMessage,
        DatasetType::LaunchSite,
        DatasetType::DecayEvent,
    ];

    /// Convert to stable storage-key string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            DatasetType::Catalog => "catalog",
            DatasetType::OrbitalElements => "orbital-elements",
            DatasetType::PopulationSummary => "population-summary",
            DatasetType::ConjunctionMessage => "conjunction-message",
            DatasetType::LaunchSite => "launch-site",
            DatasetType::DecayEvent => "decay-event",
        }
    }

    /// Parse from storage-key string representation.
    pub fn from_db_str(s: &str) -> Result<Self, DatasetTypeParseError> {
        match s {
            "catalog" => Ok(DatasetType::Catalog),
            "orbital-elements" => Ok(DatasetType::OrbitalElements),
            "population-summary" => Ok(DatasetType::PopulationSummary),
            "conjunction-message" => Ok(DatasetType::ConjunctionMessage),
            "launch-site" => Ok(DatasetType::LaunchSite),
            "decay-event" => Ok(DatasetType::DecayEvent),
            _ => Err(DatasetTypeParseError(s.to_string())),
        }
    }

    /// The field name that carries the natural record key for this dataset.
    pub fn natural_key_field(&self) -> &'static str {
        match self {
            DatasetType::Catalog => "NORAD_CAT_ID",
            DatasetType::OrbitalElements => "NORAD_CAT_ID",
            DatasetType::PopulationSummary => "COUNTRY",
            DatasetType::ConjunctionMessage => "CDM_ID",
            DatasetType::LaunchSite => "SITE_CODE",
            DatasetType::DecayEvent => "NORAD_CAT_ID",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for DatasetType {
    type Err = DatasetTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid dataset type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetTypeParseError(pub String);

impl fmt::Display for DatasetTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid dataset type: {}", self.0)
    }
}

impl std::error::Error for DatasetTypeParseError {}

/// Granularity of the freshness clock for a dataset type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeGranularity {
    /// One freshness clock for the whole dataset.
    Global,
    /// Independent clock per tracked object id.
    PerObject,
}

/// The unit of freshness tracking: dataset-wide or per tracked object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKey {
    /// Dataset-wide sentinel scope.
    Global,
    /// A single tracked object, keyed by its catalog identifier.
    Object(String),
}

impl ScopeKey {
    /// Construct an object scope from anything stringy.
    pub fn object(id: impl Into<String>) -> Self {
        ScopeKey::Object(id.into())
    }

    /// Returns true for the dataset-wide sentinel.
    pub fn is_global(&self) -> bool {
        matches!(self, ScopeKey::Global)
    }

    /// The object id, if this is an object scope.
    pub fn object_id(&self) -> Option<&str> {
        match self {
            ScopeKey::Global => None,
            ScopeKey::Object(id) => Some(id),
        }
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKey::Global => write!(f, "*"),
            ScopeKey::Object(id) => write!(f, "{}", id),
        }
    }
}
