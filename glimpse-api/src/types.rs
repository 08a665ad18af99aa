//! Response bodies for the Glimpse HTTP API.

use chrono::{DateTime, Utc};
use glimpse_core::{AuditLogEntry, Fingerprint};
use serde::{Deserialize, Serialize};

use crate::processor::ProcessedImage;

/// Body of a successful `POST /process-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProcessImageResponse {
    /// Always `true`
    pub success: bool,
    /// SHA-256 of the uploaded bytes, lowercase hex
    pub fingerprint: Fingerprint,
    pub filename: String,
    /// Analysis output as produced by the engine
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub result: serde_json::Value,
    /// Seconds spent in the lookup (hit) or the analysis call (miss)
    pub processing_time: f64,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<ProcessedImage> for ProcessImageResponse {
    fn from(processed: ProcessedImage) -> Self {
        Self {
            success: true,
            fingerprint: processed.fingerprint,
            filename: processed.filename,
            result: processed.result,
            processing_time: processed.processing_time,
            cache_hit: processed.cache_hit,
            timestamp: processed.timestamp,
        }
    }
}

/// Body of `GET /check-status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusResponse {
    /// The HTTP server is accepting requests
    pub service_ready: bool,
    /// The analysis engine has completed warmup
    pub analysis_ready: bool,
    pub warmup_completed: bool,
    pub uptime_seconds: f64,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub endpoints: Vec<String>,
}

/// Query string of `GET /request-logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct RequestLogQuery {
    /// Number of entries to return, newest first
    pub limit: Option<usize>,
}

/// Body of `GET /request-logs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RequestLogResponse {
    pub entries: Vec<AuditLogEntry>,
    /// Total number of stored entries
    pub total: u64,
}
