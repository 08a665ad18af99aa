//! API Configuration Module
//!
//! Server address, upload limits, timeouts and CORS. Configuration is loaded
//! from environment variables with sensible defaults for development.

use std::net::SocketAddr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ANALYSIS_TIMEOUT_SECS, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_HOST,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PORT, DEFAULT_SHUTDOWN_GRACE_SECS,
};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for the HTTP server and request pipeline.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    /// Host interface to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Full bind address, overriding host and port when set.
    pub bind: Option<String>,

    // ========================================================================
    // Request pipeline
    // ========================================================================
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,

    /// Upper bound on a single analysis call.
    pub analysis_timeout: Duration,

    /// Time allowed for pending persistence writes during shutdown.
    pub shutdown_grace: Duration,

    // ========================================================================
    // CORS
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            bind: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
            cors_origins: Vec::new(),
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GLIMPSE_API_BIND`: Full bind address, e.g. `127.0.0.1:9000`
    /// - `API_HOST`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `API_PORT`: Bind port (default: 8000)
    /// - `GLIMPSE_MAX_UPLOAD_BYTES`: Upload limit (default: 10 MiB)
    /// - `GLIMPSE_ANALYSIS_TIMEOUT_SECS`: Analysis timeout (default: 60)
    /// - `GLIMPSE_SHUTDOWN_GRACE_SECS`: Shutdown drain window (default: 10)
    /// - `GLIMPSE_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `GLIMPSE_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = std::env::var("GLIMPSE_API_BIND")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let host = std::env::var("API_HOST")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("API_PORT"))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_upload_bytes = std::env::var("GLIMPSE_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.max_upload_bytes);

        let analysis_timeout = std::env::var("GLIMPSE_ANALYSIS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &u64| *n > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.analysis_timeout);

        let shutdown_grace = std::env::var("GLIMPSE_SHUTDOWN_GRACE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.shutdown_grace);

        let cors_origins = std::env::var("GLIMPSE_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("GLIMPSE_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        Self {
            host,
            port,
            bind,
            max_upload_bytes,
            analysis_timeout,
            shutdown_grace,
            cors_origins,
            cors_max_age_secs,
        }
    }

    /// Resolve the socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let raw = match &self.bind {
            Some(bind) => bind.clone(),
            None => format!("{}:{}", self.host, self.port),
        };
        raw.parse()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address '{}': {}", raw, e)))
    }

    /// Check if running with a strict CORS origin list.
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}
