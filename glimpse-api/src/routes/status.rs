//! Service information, readiness status and request log endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use glimpse_core::ServiceState;
use glimpse_storage::StorageHandles;

use crate::constants::{DEFAULT_LOG_PAGE_SIZE, MAX_LOG_PAGE_SIZE, SERVICE_NAME};
use crate::error::{ApiError, ApiResult};
use crate::types::{RequestLogQuery, RequestLogResponse, ServiceInfo, StatusResponse};

/// Routes listed by `GET /`.
const ENDPOINTS: &[&str] = &[
    "/process-image",
    "/check-status",
    "/request-logs",
    "/health/ping",
    "/health/live",
    "/health/ready",
    "/metrics",
];

/// GET / - Service information
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/",
    tag = "Status",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo),
    ),
))]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}

/// GET /check-status - Readiness and uptime
///
/// Always answers 200 while the process is serving, ready or not.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/check-status",
    tag = "Status",
    responses(
        (status = 200, description = "Current readiness", body = StatusResponse),
    ),
))]
pub async fn check_status(State(service): State<Arc<ServiceState>>) -> Json<StatusResponse> {
    let ready = service.is_ready();
    Json(StatusResponse {
        service_ready: true,
        analysis_ready: ready,
        warmup_completed: ready,
        uptime_seconds: service.uptime_seconds(),
    })
}

/// GET /request-logs - Most recent audit entries, newest first
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/request-logs",
    tag = "Status",
    params(RequestLogQuery),
    responses(
        (status = 200, description = "Recent request log entries", body = RequestLogResponse),
        (status = 400, description = "Invalid limit", body = ApiError),
        (status = 500, description = "Audit log unavailable", body = ApiError),
    ),
))]
pub async fn request_logs(
    State(storage): State<StorageHandles>,
    Query(query): Query<RequestLogQuery>,
) -> ApiResult<Json<RequestLogResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_PAGE_SIZE);
    if limit == 0 || limit > MAX_LOG_PAGE_SIZE {
        return Err(ApiError::invalid_input(format!(
            "limit must be between 1 and {}",
            MAX_LOG_PAGE_SIZE
        )));
    }

    let entries = storage
        .audit
        .recent(limit)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read request logs: {}", e)))?;
    let total = storage
        .audit
        .entry_count()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to count request logs: {}", e)))?;

    Ok(Json(RequestLogResponse { entries, total }))
}
