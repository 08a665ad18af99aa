//! Scripted analysis engines.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use glimpse_core::{AnalysisEngine, AnalysisError};
use serde_json::Value;

/// Returns a fixed payload and counts calls.
#[derive(Debug)]
pub struct CountingEngine {
    result: Value,
    delay: Duration,
    warmups: AtomicUsize,
    analyses: AtomicUsize,
}

impl CountingEngine {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            warmups: AtomicUsize::new(0),
            analyses: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` inside every `analyze` call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn warmup_calls(&self) -> usize {
        self.warmups.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisEngine for CountingEngine {
    fn name(&self) -> &str {
        "counting"
    }

    async fn warmup(&self) -> Result<(), AnalysisError> {
        self.warmups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn analyze(&self, _data: Bytes) -> Result<Value, AnalysisError> {
        self.analyses.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.result.clone())
    }
}

/// Fails warmup or analysis with a scripted error.
#[derive(Debug)]
pub struct FailingEngine {
    warmup_error: Option<String>,
    analysis_error: Option<AnalysisError>,
}

impl FailingEngine {
    pub fn failing_warmup(reason: impl Into<String>) -> Self {
        Self {
            warmup_error: Some(reason.into()),
            analysis_error: None,
        }
    }

    pub fn failing_analysis(reason: impl Into<String>) -> Self {
        Self::with_analysis_error(AnalysisError::Failed(reason.into()))
    }

    pub fn with_analysis_error(error: AnalysisError) -> Self {
        Self {
            warmup_error: None,
            analysis_error: Some(error),
        }
    }
}

#[async_trait]
impl AnalysisEngine for FailingEngine {
    fn name(&self) -> &str {
        "failing"
    }

    async fn warmup(&self) -> Result<(), AnalysisError> {
        match &self.warmup_error {
            Some(reason) => Err(AnalysisError::WarmupFailed(reason.clone())),
            None => Ok(()),
        }
    }

    async fn analyze(&self, _data: Bytes) -> Result<Value, AnalysisError> {
        match &self.analysis_error {
            Some(err) => Err(err.clone()),
            None => Ok(Value::Null),
        }
    }
}

/// Sleeps longer than any sensible timeout before answering.
#[derive(Debug)]
pub struct SlowEngine {
    delay: Duration,
}

impl SlowEngine {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl AnalysisEngine for SlowEngine {
    fn name(&self) -> &str {
        "slow"
    }

    async fn warmup(&self) -> Result<(), AnalysisError> {
        Ok(())
    }

    async fn analyze(&self, _data: Bytes) -> Result<Value, AnalysisError> {
        tokio::time::sleep(self.delay).await;
        Ok(serde_json::json!({"slow": true}))
    }
}
