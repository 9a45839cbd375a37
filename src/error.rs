//! Error types for bench-ledger
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// bench-ledger error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input to `append` (missing commit id, empty benches, ...)
    #[error("Validation error: {0}\nThe run record was not persisted")]
    Validation(String),

    /// A measurement's unit conflicts with the unit already recorded for it
    #[error("Unit mismatch in suite '{suite}' for '{measurement}': history uses '{expected}', record uses '{found}'\nThe whole record was rejected")]
    UnitMismatch {
        /// Suite the record was appended to
        suite: String,
        /// Measurement name
        measurement: String,
        /// Unit first observed in the suite
        expected: String,
        /// Unit carried by the rejected record
        found: String,
    },

    /// Suite has never been appended to
    #[error("Suite not found: {0}")]
    SuiteNotFound(String),

    /// Commit is not part of the suite's history
    #[error("Commit '{commit}' not found in suite '{suite}'")]
    CommitNotFound {
        /// Suite that was searched
        suite: String,
        /// Missing commit id
        commit: String,
    },

    /// Detector configuration is unusable
    #[error("Invalid detector configuration: {0}")]
    InvalidConfig(String),

    /// Persisted history snapshot is malformed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
