//! Glimpse Test Utilities
//!
//! Centralized test infrastructure for the Glimpse workspace:
//! - Encoded image fixtures
//! - Scripted analysis engines (counting, failing, slow)
//! - A result store with injectable failures
//! - Proptest generators for uploads

pub mod engines;
pub mod fixtures;
pub mod stores;

// Re-export the in-memory store from its source crate
pub use glimpse_storage::InMemoryStore;

// Re-export core types for convenience
pub use glimpse_core::{
    fingerprint, AnalysisEngine, AnalysisError, AuditLogEntry, CachedResult, Fingerprint,
    InsertOutcome, RequestStatus, ServiceState, StorageError, ValidationError,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;

    /// Non-empty raw upload bytes.
    pub fn arb_upload_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 1..2048)
    }

    /// Media types the upload validator accepts.
    pub fn arb_image_media_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("image/jpeg".to_string()),
            Just("image/png".to_string()),
            Just("image/gif".to_string()),
            Just("image/webp".to_string()),
            "[a-z]{1,10}".prop_map(|sub| format!("image/{}", sub)),
        ]
    }

    /// Media types the upload validator rejects.
    pub fn arb_non_image_media_type() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("text/plain".to_string()),
            Just("application/json".to_string()),
            Just("application/octet-stream".to_string()),
            Just("video/mp4".to_string()),
            "(audio|text|application)/[a-z]{1,10}",
        ]
    }

    pub fn arb_filename() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_-]{1,16}\\.(jpg|png|gif)"
    }
}
