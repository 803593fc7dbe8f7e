//! Configuration types

use crate::error::{ConfigError, OrbSyncError, OrbSyncResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream provider connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    /// Bounded per-request timeout; a timeout counts as endpoint failure.
    pub request_timeout: Duration,
    /// Minimum spacing between consecutive upstream requests.
    pub min_request_interval: Duration,
    /// Sessions older than this are re-authenticated before the next query.
    pub session_max_age: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.space-track.org".to_string(),
            request_timeout: Duration::from_secs(30),
            min_request_interval: Duration::from_secs(2),
            session_max_age: Duration::from_secs(300),
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbSyncConfig {
    pub provider: ProviderSettings,
    /// Days past an element set's epoch before samples are flagged degraded.
    pub accuracy_horizon_days: i64,
    /// Default z-score threshold for anomaly detection.
    pub default_anomaly_threshold: f64,
}

impl Default for OrbSyncConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::default(),
            accuracy_horizon_days: 30,
            default_anomaly_threshold: 3.0,
        }
    }
}

impl OrbSyncConfig {
    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(OrbSyncError::Config) if invalid.
    pub fn validate(&self) -> OrbSyncResult<()> {
        if self.provider.base_url.is_empty() {
            return Err(OrbSyncError::Config(ConfigError::MissingRequired {
                field: "provider.base_url".to_string(),
            }));
        }

        if self.provider.request_timeout.is_zero() {
            return Err(OrbSyncError::Config(ConfigError::InvalidValue {
                field: "provider.request_timeout".to_string(),
                value: format!("{:?}", self.provider.request_timeout),
                reason: "request_timeout must be positive".to_string(),
            }));
        }

        if self.provider.session_max_age.is_zero() {
            return Err(OrbSyncError::Config(ConfigError::InvalidValue {
                field: "provider.session_max_age".to_string(),
                value: format!("{:?}", self.provider.session_max_age),
                reason: "session_max_age must be positive".to_string(),
            }));
        }

        if self.accuracy_horizon_days <= 0 {
            return Err(OrbSyncError::Config(ConfigError::InvalidValue {
                field: "accuracy_horizon_days".to_string(),
                value: self.accuracy_horizon_days.to_string(),
                reason: "accuracy_horizon_days must be greater than 0".to_string(),
            }));
        }

        if !self.default_anomaly_threshold.is_finite() || self.default_anomaly_threshold <= 0.0 {
            return Err(OrbSyncError::Config(ConfigError::InvalidValue {
                field: "default_anomaly_threshold".to_string(),
                value: self.default_anomaly_threshold.to_string(),
                reason: "default_anomaly_threshold must be positive and finite".to_string(),
            }));
        }

        Ok(())
    }
}
