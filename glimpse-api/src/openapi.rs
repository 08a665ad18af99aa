//! OpenAPI Documentation Module
//!
//! Aggregates all endpoint and schema definitions into a single OpenAPI
//! document served at `/openapi.json` and printed by `generate-openapi`.

use axum::Json;
use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::types::{ProcessImageResponse, RequestLogResponse, ServiceInfo, StatusResponse};
use glimpse_core::{AuditLogEntry, Fingerprint, RequestStatus};

/// OpenAPI document for the Glimpse API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Glimpse API",
        description = "Content-addressed image feature detection with result reuse",
        license(name = "MIT"),
    ),
    paths(
        crate::routes::status::root,
        crate::routes::image::process_image,
        crate::routes::status::check_status,
        crate::routes::status::request_logs,
        crate::routes::health::ping,
        crate::routes::health::liveness,
        crate::routes::health::readiness,
        crate::telemetry::metrics::metrics_handler,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        ProcessImageResponse,
        StatusResponse,
        ServiceInfo,
        RequestLogResponse,
        AuditLogEntry,
        RequestStatus,
        Fingerprint,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    )),
    tags(
        (name = "Images", description = "Image analysis"),
        (name = "Status", description = "Service status and request logs"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    ),
)]
pub struct ApiDoc;

/// GET /openapi.json - The OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/process-image", "/check-status", "/health/ready", "/metrics"] {
            assert!(doc.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_openapi_serializes() -> Result<(), serde_json::Error> {
        let json = ApiDoc::openapi().to_pretty_json()?;
        assert!(json.contains("Glimpse API"));
        Ok(())
    }
}
