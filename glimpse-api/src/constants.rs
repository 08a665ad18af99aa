//! Constants for Glimpse API
//!
//! Centralized default values for the HTTP surface.

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8000;

/// Human-readable service name reported by `/`
pub const SERVICE_NAME: &str = "Glimpse Image Feature Detection API";

// ============================================================================
// UPLOADS
// ============================================================================

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Slack on top of the upload limit for multipart framing
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// ============================================================================
// TIMEOUTS
// ============================================================================

/// Default per-request analysis timeout in seconds
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 60;

/// Default time allowed for in-flight persistence writes on shutdown
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// REQUEST LOG QUERIES
// ============================================================================

/// Default number of audit entries returned by `/request-logs`
pub const DEFAULT_LOG_PAGE_SIZE: usize = 50;

/// Maximum number of audit entries returned by `/request-logs`
pub const MAX_LOG_PAGE_SIZE: usize = 500;
