//! Error types for Glimpse.
//!
//! Each failure class is its own enum so callers can match on exactly the
//! cases they handle. Validation and analysis failures reach the caller of a
//! request; storage failures never do.

use thiserror::Error;

/// Errors parsing a fingerprint from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("Fingerprint must be 64 hex characters, got {actual}")]
    InvalidLength { actual: usize },

    #[error("Fingerprint contains non-hex character {0:?}")]
    InvalidCharacter(char),
}

/// Upload rejected before fingerprinting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File must be an image")]
    NotAnImage { media_type: Option<String> },

    #[error("File is empty")]
    EmptyPayload,

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
}

/// Failures of the analysis engine or its adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Analysis engine is not ready")]
    NotReady,

    #[error("Unsupported or malformed image: {0}")]
    UnsupportedImage(String),

    #[error("Analysis timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("Warmup failed: {0}")]
    WarmupFailed(String),
}

/// Result store and audit log failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Corrupted record under key {key}: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Master error type for all Glimpse errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GlimpseError {
    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] FingerprintError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for Glimpse operations.
pub type GlimpseResult<T> = Result<T, GlimpseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_are_caller_safe() {
        let err = ValidationError::NotAnImage {
            media_type: Some("text/plain".to_string()),
        };
        assert_eq!(err.to_string(), "File must be an image");
        assert_eq!(ValidationError::EmptyPayload.to_string(), "File is empty");
    }

    #[test]
    fn test_analysis_error_display() {
        let err = AnalysisError::Timeout { elapsed_ms: 60_000 };
        assert!(err.to_string().contains("60000ms"));

        let err = AnalysisError::UnsupportedImage("bad header".to_string());
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn test_master_error_from_conversions() {
        let err: GlimpseError = StorageError::LockPoisoned.into();
        assert!(matches!(err, GlimpseError::Storage(StorageError::LockPoisoned)));
        assert!(err.to_string().starts_with("Storage error"));

        let err: GlimpseError = AnalysisError::NotReady.into();
        assert!(matches!(err, GlimpseError::Analysis(AnalysisError::NotReady)));
    }
}
