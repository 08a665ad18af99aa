//! Readiness-gated wrapper around an `AnalysisEngine`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use glimpse_core::{AnalysisEngine, AnalysisError, ServiceState};
use serde_json::Value;
use tokio::sync::Mutex;

/// Lifecycle adapter: `NotReady` until `warmup` succeeds, then `Ready` for good.
///
/// Readiness is recorded on the shared `ServiceState`, so every holder of that
/// state observes the transition.
pub struct EngineAdapter {
    engine: Arc<dyn AnalysisEngine>,
    state: Arc<ServiceState>,
    timeout: Duration,
    warmup_lock: Mutex<()>,
}

impl EngineAdapter {
    pub fn new(
        engine: Arc<dyn AnalysisEngine>,
        state: Arc<ServiceState>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            state,
            timeout,
            warmup_lock: Mutex::new(()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> &Arc<ServiceState> {
        &self.state
    }

    /// Run the engine warmup once. Later calls return immediately.
    ///
    /// On failure the adapter stays `NotReady`.
    pub async fn warmup(&self) -> Result<(), AnalysisError> {
        let _guard = self.warmup_lock.lock().await;
        if self.state.is_ready() {
            return Ok(());
        }

        let start = Instant::now();
        tracing::info!(engine = self.engine.name(), "Warming up analysis engine");

        self.engine.warmup().await.map_err(|e| match e {
            AnalysisError::WarmupFailed(_) => e,
            other => AnalysisError::WarmupFailed(other.to_string()),
        })?;

        self.state.mark_ready();
        tracing::info!(
            engine = self.engine.name(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis engine ready"
        );
        Ok(())
    }

    /// Analyze `data`, bounded by the configured timeout.
    pub async fn analyze(&self, data: Bytes) -> Result<Value, AnalysisError> {
        if !self.state.is_ready() {
            return Err(AnalysisError::NotReady);
        }

        match tokio::time::timeout(self.timeout, self.engine.analyze(data)).await {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout {
                elapsed_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_test_utils::engines::{CountingEngine, FailingEngine, SlowEngine};
    use serde_json::json;

    fn adapter_with(engine: Arc<dyn AnalysisEngine>) -> EngineAdapter {
        EngineAdapter::new(engine, Arc::new(ServiceState::new()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_analyze_before_warmup_is_rejected() {
        let engine = Arc::new(CountingEngine::new(json!({"keypoints": 1})));
        let adapter = adapter_with(engine.clone());

        let err = adapter
            .analyze(Bytes::from_static(b"img"))
            .await
            .expect_err("should not be ready");
        assert_eq!(err, AnalysisError::NotReady);
        assert_eq!(engine.analyze_calls(), 0);
    }

    #[tokio::test]
    async fn test_warmup_transitions_once() {
        let engine = Arc::new(CountingEngine::new(json!({"keypoints": 1})));
        let adapter = adapter_with(engine.clone());
        assert!(!adapter.is_ready());

        adapter.warmup().await.expect("warmup should succeed");
        adapter.warmup().await.expect("second warmup should be a no-op");

        assert!(adapter.is_ready());
        assert!(adapter.state().is_ready());
        assert_eq!(engine.warmup_calls(), 1);

        let result = adapter
            .analyze(Bytes::from_static(b"img"))
            .await
            .expect("analyze should succeed");
        assert_eq!(result, json!({"keypoints": 1}));
        assert_eq!(engine.analyze_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_warmups_run_engine_once() {
        let engine = Arc::new(CountingEngine::new(json!({})));
        let adapter = Arc::new(adapter_with(engine.clone()));

        let a = tokio::spawn({
            let adapter = Arc::clone(&adapter);
            async move { adapter.warmup().await }
        });
        let b = tokio::spawn({
            let adapter = Arc::clone(&adapter);
            async move { adapter.warmup().await }
        });
        a.await.expect("task should not panic").expect("warmup should succeed");
        b.await.expect("task should not panic").expect("warmup should succeed");

        assert_eq!(engine.warmup_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_warmup_stays_not_ready() {
        let adapter = adapter_with(Arc::new(FailingEngine::failing_warmup("model missing")));

        let err = adapter.warmup().await.expect_err("warmup should fail");
        assert!(matches!(
            err,
            AnalysisError::WarmupFailed(ref msg) if msg.contains("model missing")
        ));
        assert!(!adapter.is_ready());
    }

    #[tokio::test]
    async fn test_analysis_errors_pass_through() {
        let adapter = adapter_with(Arc::new(FailingEngine::failing_analysis("corrupt")));
        adapter.warmup().await.expect("warmup should succeed");

        let err = adapter
            .analyze(Bytes::from_static(b"img"))
            .await
            .expect_err("analysis should fail");
        assert!(matches!(err, AnalysisError::Failed(ref msg) if msg.contains("corrupt")));
    }

    #[tokio::test]
    async fn test_slow_analysis_times_out() {
        let adapter = EngineAdapter::new(
            Arc::new(SlowEngine::new(Duration::from_secs(10))),
            Arc::new(ServiceState::new()),
            Duration::from_millis(50),
        );
        adapter.warmup().await.expect("warmup should succeed");

        let err = adapter
            .analyze(Bytes::from_static(b"img"))
            .await
            .expect_err("analysis should time out");
        assert_eq!(err, AnalysisError::Timeout { elapsed_ms: 50 });
    }
}
