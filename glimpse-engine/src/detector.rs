//! `AnalysisEngine` implementation backed by the corner detector.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use glimpse_core::{AnalysisEngine, AnalysisError};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::config::DetectorConfig;
use crate::features::{calibration_image, detect, detect_from_bytes};

/// Feature detector running on the tokio blocking pool.
///
/// At most `workers` detections run at once; further requests wait for a
/// permit. The permit moves into the blocking task, so a caller that gives
/// up (for example on timeout) does not free a slot before the CPU work ends.
pub struct FeatureDetector {
    config: DetectorConfig,
    permits: Arc<Semaphore>,
}

impl FeatureDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.workers.max(1)));
        Self { config, permits }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl Default for FeatureDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[async_trait]
impl AnalysisEngine for FeatureDetector {
    fn name(&self) -> &str {
        "harris-corner-detector"
    }

    async fn warmup(&self) -> Result<(), AnalysisError> {
        let start = Instant::now();
        let config = self.config.clone();

        let features = tokio::task::spawn_blocking(move || detect(&calibration_image(), &config))
            .await
            .map_err(|e| AnalysisError::WarmupFailed(format!("calibration task failed: {e}")))?
            .map_err(|e| AnalysisError::WarmupFailed(e.to_string()))?;

        if features.keypoints.is_empty() {
            return Err(AnalysisError::WarmupFailed(
                "calibration image produced no keypoints".to_string(),
            ));
        }

        tracing::debug!(
            keypoints = features.keypoints.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Calibration detection complete"
        );

        if !self.config.warmup_delay.is_zero() {
            tokio::time::sleep(self.config.warmup_delay).await;
        }
        Ok(())
    }

    async fn analyze(&self, data: Bytes) -> Result<Value, AnalysisError> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| AnalysisError::Failed("detector is shutting down".to_string()))?;
        let config = self.config.clone();

        let features = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            detect_from_bytes(&data, &config)
        })
        .await
        .map_err(|e| AnalysisError::Failed(format!("detection task failed: {e}")))??;

        Ok(features.summary())
    }
}
