//! Glimpse API Server Entry Point
//!
//! Bootstraps configuration, opens the result store, starts the Axum HTTP
//! server and warms up the analysis engine in the background. A failed
//! warmup shuts the server down with an error.

use std::sync::Arc;

use glimpse_api::telemetry::{init_tracing, metrics::with_metrics, TelemetryConfig};
use glimpse_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use glimpse_core::ServiceState;
use glimpse_engine::{DetectorConfig, EngineAdapter, FeatureDetector};
use glimpse_storage::StorageConfig;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env();
    let storage = glimpse_storage::open(&StorageConfig::from_env())
        .map_err(|e| ApiError::internal_error(format!("Failed to open result store: {}", e)))?;

    let detector = Arc::new(FeatureDetector::new(DetectorConfig::from_env()));
    let engine = Arc::new(EngineAdapter::new(
        detector,
        Arc::new(ServiceState::new()),
        api_config.analysis_timeout,
    ));
    with_metrics(|m| m.set_engine_ready(false));

    let state = AppState::new(api_config.clone(), storage, engine.clone());
    let background = state.processor.background().clone();
    let app = create_api_router(state);

    let addr = api_config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(%addr, "Starting Glimpse API server");

    let shutdown = CancellationToken::new();
    let warmup = tokio::spawn(run_warmup(engine, shutdown.clone()));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)));

    shutdown.cancel();
    let warmed = match warmup.await {
        Ok(result) => result,
        Err(e) => Err(ApiError::internal_error(format!("Warmup task failed: {}", e))),
    };

    if background.shutdown(api_config.shutdown_grace).await {
        tracing::info!("Pending persistence writes flushed");
    }
    tracing::info!("Server shutdown complete");

    served?;
    warmed
}

/// Warm up the engine, cancelling `shutdown` if warmup fails.
async fn run_warmup(engine: Arc<EngineAdapter>, shutdown: CancellationToken) -> ApiResult<()> {
    tokio::select! {
        result = engine.warmup() => match result {
            Ok(()) => {
                with_metrics(|m| m.set_engine_ready(true));
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Analysis engine warmup failed, shutting down");
                shutdown.cancel();
                Err(ApiError::internal_error(format!("Analysis engine warmup failed: {}", e)))
            }
        },
        _ = shutdown.cancelled() => Ok(()),
    }
}

/// Resolves on Ctrl+C, SIGTERM or cancellation of `token`.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutdown signal received"),
        _ = terminate => tracing::info!("Termination signal received"),
        _ = token.cancelled() => tracing::info!("Shutdown requested"),
    }
}
