//! Application State Module
//!
//! Shared state handed to every Axum handler. Handlers extract only the
//! pieces they need through `FromRef`.

use std::sync::Arc;

use glimpse_core::ServiceState;
use glimpse_engine::EngineAdapter;
use glimpse_storage::StorageHandles;

use crate::config::ApiConfig;
use crate::impl_from_ref;
use crate::processor::ImageProcessor;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Request pipeline
    pub processor: Arc<ImageProcessor>,
    /// Readiness-gated analysis engine
    pub engine: Arc<EngineAdapter>,
    /// Process-wide readiness flag and start time
    pub service: Arc<ServiceState>,
    /// Result store and audit log
    pub storage: StorageHandles,
    /// API configuration
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wire the pipeline from its collaborators.
    pub fn new(config: ApiConfig, storage: StorageHandles, engine: Arc<EngineAdapter>) -> Self {
        let processor = Arc::new(ImageProcessor::new(
            storage.clone(),
            engine.clone(),
            config.max_upload_bytes,
        ));
        Self {
            processor,
            service: engine.state().clone(),
            engine,
            storage,
            config: Arc::new(config),
        }
    }
}

impl_from_ref!(Arc<ImageProcessor>, processor);
impl_from_ref!(Arc<EngineAdapter>, engine);
impl_from_ref!(Arc<ServiceState>, service);
impl_from_ref!(StorageHandles, storage);
impl_from_ref!(Arc<ApiConfig>, config);
