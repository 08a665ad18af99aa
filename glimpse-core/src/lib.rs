//! Glimpse Core - Shared Types for the Image Result Cache
//!
//! Fingerprinting, persisted record types, the error taxonomy, readiness
//! state and the analysis engine capability. Storage backends, the engine
//! implementation and the HTTP layer build on these.

pub mod analysis;
pub mod entities;
pub mod error;
pub mod fingerprint;
pub mod readiness;
pub mod validation;

pub use analysis::AnalysisEngine;
pub use entities::{
    AuditLogEntry, CachedResult, InsertOutcome, RequestStatus, PROCESS_IMAGE_ENDPOINT, UNKNOWN,
};
pub use error::{
    AnalysisError, FingerprintError, GlimpseError, GlimpseResult, StorageError, ValidationError,
};
pub use fingerprint::{fingerprint, Fingerprint, FINGERPRINT_LEN};
pub use readiness::ServiceState;
pub use validation::{validate_upload, IMAGE_MEDIA_PREFIX};
