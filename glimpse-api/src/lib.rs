//! Glimpse API - HTTP Surface for the Image Result Cache
//!
//! Accepts image uploads, fingerprints them, serves stored results for
//! previously seen content and analyzes new content through the
//! readiness-gated engine. Persistence runs in the background and never
//! affects responses.
//!
//! Modules:
//! - `processor`: the request pipeline
//! - `background`: tracked result inserts and audit appends
//! - `routes`: Axum handlers and router assembly
//! - `telemetry`: tracing subscriber, Prometheus metrics, request middleware

pub mod background;
pub mod config;
pub mod constants;
pub mod error;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod processor;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

pub use background::BackgroundTasks;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use processor::{ImageProcessor, ProcessError, ProcessedImage, Upload};
pub use routes::create_api_router;
pub use state::AppState;
pub use types::{ProcessImageResponse, RequestLogResponse, ServiceInfo, StatusResponse};
