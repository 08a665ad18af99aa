//! REST API Routes Module
//!
//! Assembles the public router:
//! - `/` service information
//! - `/process-image` image analysis with result reuse
//! - `/check-status` readiness and uptime
//! - `/request-logs` recent audit entries
//! - `/health/*` liveness and readiness probes
//! - `/metrics` Prometheus scrape endpoint
//! - `/openapi.json` API description (openapi feature)

pub mod health;
pub mod image;
pub mod status;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::constants::MULTIPART_OVERHEAD_BYTES;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

/// Create the complete API router.
pub fn create_api_router(state: AppState) -> Router {
    let config = state.config.clone();
    let body_limit = config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        .route("/", get(status::root))
        .route("/process-image", post(image::process_image))
        .route("/check-status", get(status::check_status))
        .route("/request-logs", get(status::request_logs))
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler));

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", get(crate::openapi::openapi_json));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(&config))
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
