//! Error types for the riskwatch crate

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum RiskwatchError {
    /// Persistent store failure (connectivity, contention, bad state)
    #[error("Store error: {0}")]
    Store(String),

    /// Model artifact missing at the expected location
    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Version tag does not match `v<major>.<minor>.<patch>`
    #[error("Invalid version format: {0}")]
    VersionFormat(String),

    /// Candidate model training failure
    #[error("Training error: {0}")]
    Training(String),

    /// Invalid input or configuration
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not enough data to produce a meaningful result. Callers treat
    /// this as an explicit no-op, never as a zero-valued metric.
    #[error("Insufficient data: needed {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

/// Result type alias using RiskwatchError
pub type Result<T> = std::result::Result<T, RiskwatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RiskwatchError::VersionFormat("bad-version".to_string());
        assert_eq!(err.to_string(), "Invalid version format: bad-version");
    }

    #[test]
    fn test_insufficient_data_display() {
        let err = RiskwatchError::InsufficientData { needed: 50, got: 12 };
        assert_eq!(err.to_string(), "Insufficient data: needed 50, got 12");
    }
}
