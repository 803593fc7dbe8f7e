//! Error types for OrbSync operations

use crate::dataset::{DatasetType, ScopeKey};
use crate::Timestamp;
use thiserror::Error;

/// Policy registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("No refresh policy registered for dataset type {dataset_type}")]
    UnknownDatasetType { dataset_type: DatasetType },
}

/// Cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store lock poisoned")]
    LockPoisoned,

    #[error("Upsert for {dataset_type}/{scope_key} would move last_synced_at backwards: {attempted} < {current}")]
    TimestampRegression {
        dataset_type: DatasetType,
        scope_key: ScopeKey,
        current: Timestamp,
        attempted: Timestamp,
    },

    #[error("Backend error: {reason}")]
    Backend { reason: String },
}

/// Upstream provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Failed to construct HTTP client: {reason}")]
    ClientInit { reason: String },

    #[error("Upstream credentials missing or rejected: {reason}")]
    AuthFailed { reason: String },

    #[error("Endpoint {endpoint} failed with status {status}: {message}")]
    EndpointFailed {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("All {attempted} candidate endpoints exhausted for {dataset_type}: {last_error}")]
    AllEndpointsExhausted {
        dataset_type: DatasetType,
        attempted: usize,
        last_error: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Propagation-layer errors, surfaced with the record identifier so the
/// caller can decide to drop or flag the result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PropagationError {
    #[error("Invalid element set for object {object_id}: {reason}")]
    InvalidElementSet { object_id: String, reason: String },

    #[error("Propagation for object {object_id} produced a non-finite state at {timestamp}")]
    NonFiniteState {
        object_id: String,
        timestamp: Timestamp,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all OrbSync errors.
#[derive(Debug, Clone, Error)]
pub enum OrbSyncError {
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for OrbSync operations.
pub type OrbSyncResult<T> = Result<T, OrbSyncError>;

// =============================================================================
// TESTS
// =============================================================================
