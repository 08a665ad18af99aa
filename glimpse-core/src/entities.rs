//! Persisted records: cached analysis results and audit log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint::Fingerprint;

/// Placeholder used in audit entries when a fingerprint or filename is unavailable.
pub const UNKNOWN: &str = "unknown";

/// Endpoint label written to audit entries for image processing requests.
pub const PROCESS_IMAGE_ENDPOINT: &str = "/process-image";

// ============================================================================
// CACHED RESULT
// ============================================================================

/// Analysis output stored under its content fingerprint.
///
/// Written once, on the first successful analysis of some content, and never
/// updated afterwards. `cache_hit` is always `false` in storage; it describes
/// the request that produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CachedResult {
    pub fingerprint: Fingerprint,
    pub filename: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub result: Value,
    /// Seconds spent in analysis.
    pub processing_time: f64,
    pub created_at: DateTime<Utc>,
    pub cache_hit: bool,
}

impl CachedResult {
    pub fn new(
        fingerprint: Fingerprint,
        filename: impl Into<String>,
        result: Value,
        processing_time: f64,
    ) -> Self {
        Self {
            fingerprint,
            filename: filename.into(),
            result,
            processing_time,
            created_at: Utc::now(),
            cache_hit: false,
        }
    }
}

/// Outcome of a result store insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new record was written.
    Inserted,
    /// A record for the fingerprint already existed and was left untouched.
    AlreadyPresent,
}

// ============================================================================
// AUDIT LOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Success,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Success => "success",
            RequestStatus::Error => "error",
        }
    }
}

/// One record per request attempt, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuditLogEntry {
    pub endpoint: String,
    /// Hex fingerprint, or `"unknown"` when the request failed before hashing.
    pub fingerprint: String,
    pub filename: String,
    pub cache_hit: bool,
    pub processing_time: f64,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Entry for a request that produced a result.
    pub fn success(
        endpoint: impl Into<String>,
        fingerprint: &Fingerprint,
        filename: impl Into<String>,
        cache_hit: bool,
        processing_time: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            fingerprint: fingerprint.to_string(),
            filename: filename.into(),
            cache_hit,
            processing_time,
            status: RequestStatus::Success,
            timestamp: Utc::now(),
        }
    }

    /// Entry for a failed request. Failures never count as hits and carry no timing.
    pub fn error(
        endpoint: impl Into<String>,
        fingerprint: Option<&Fingerprint>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            fingerprint: fingerprint
                .map(ToString::to_string)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            filename: filename.into(),
            cache_hit: false,
            processing_time: 0.0,
            status: RequestStatus::Error,
            timestamp: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == RequestStatus::Error
    }
}
