//! Image request pipeline.
//!
//! validate -> fingerprint -> lookup -> (hit | readiness gate -> analyze)
//! -> respond, with the result insert and audit append deferred to
//! background tasks.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use glimpse_core::{
    fingerprint, validate_upload, AnalysisError, AuditLogEntry, Fingerprint, ValidationError,
    PROCESS_IMAGE_ENDPOINT, UNKNOWN,
};
use glimpse_engine::EngineAdapter;
use glimpse_storage::{AuditLog, ResultStore, StorageHandles};
use serde_json::Value;

use crate::background::BackgroundTasks;
use crate::telemetry::metrics::with_metrics;

// ============================================================================
// TYPES
// ============================================================================

/// One uploaded file as received from the transport.
#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Bytes,
    pub media_type: Option<String>,
    pub filename: Option<String>,
}

impl Upload {
    pub fn new(data: impl Into<Bytes>, media_type: Option<&str>, filename: Option<&str>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.map(str::to_string),
            filename: filename.map(str::to_string),
        }
    }

    /// Declared filename, or `"unknown"` when absent or blank.
    pub fn display_name(&self) -> String {
        self.filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    }
}

/// Successful outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    pub fingerprint: Fingerprint,
    pub filename: String,
    pub result: Value,
    /// Seconds spent in the lookup (hit) or the analysis call (miss).
    pub processing_time: f64,
    pub cache_hit: bool,
    /// Completion time.
    pub timestamp: DateTime<Utc>,
}

/// Caller-visible pipeline failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Service not ready. Please wait for the warmup to complete.")]
    NotReady,

    #[error("Processing failed: {0}")]
    Analysis(AnalysisError),
}

impl From<AnalysisError> for ProcessError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NotReady => ProcessError::NotReady,
            other => ProcessError::Analysis(other),
        }
    }
}

// ============================================================================
// PROCESSOR
// ============================================================================

/// Orchestrates one image request against the result store and engine.
pub struct ImageProcessor {
    results: Arc<dyn ResultStore>,
    audit: Arc<dyn AuditLog>,
    engine: Arc<EngineAdapter>,
    background: BackgroundTasks,
    max_upload_bytes: usize,
}

impl ImageProcessor {
    pub fn new(
        storage: StorageHandles,
        engine: Arc<EngineAdapter>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            results: storage.results,
            audit: storage.audit,
            engine,
            background: BackgroundTasks::new(),
            max_upload_bytes,
        }
    }

    pub fn engine(&self) -> &Arc<EngineAdapter> {
        &self.engine
    }

    pub fn background(&self) -> &BackgroundTasks {
        &self.background
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Run the full pipeline for one upload.
    ///
    /// Every outcome schedules exactly one audit entry. Persistence failures
    /// are absorbed and never change the returned value.
    pub async fn process(&self, upload: Upload) -> Result<ProcessedImage, ProcessError> {
        let filename = upload.display_name();
        let mut computed: Option<Fingerprint> = None;

        let outcome = self.run(&upload, &filename, &mut computed).await;

        match &outcome {
            Ok(processed) => {
                let outcome_label = if processed.cache_hit { "hit" } else { "miss" };
                with_metrics(|m| m.record_image_outcome(outcome_label));
                tracing::info!(
                    fingerprint = %processed.fingerprint.short(),
                    filename = %processed.filename,
                    cache_hit = processed.cache_hit,
                    processing_time = processed.processing_time,
                    "Image processed"
                );
                self.background.spawn_audit(
                    self.audit.clone(),
                    AuditLogEntry::success(
                        PROCESS_IMAGE_ENDPOINT,
                        &processed.fingerprint,
                        processed.filename.clone(),
                        processed.cache_hit,
                        processed.processing_time,
                    ),
                );
            }
            Err(e) => {
                with_metrics(|m| m.record_image_outcome("error"));
                tracing::warn!(
                    fingerprint = computed.as_ref().map(|fp| fp.short()).unwrap_or(UNKNOWN),
                    filename = %filename,
                    error = %e,
                    "Image request failed"
                );
                self.background.spawn_audit(
                    self.audit.clone(),
                    AuditLogEntry::error(PROCESS_IMAGE_ENDPOINT, computed.as_ref(), filename),
                );
            }
        }

        outcome
    }

    async fn run(
        &self,
        upload: &Upload,
        filename: &str,
        computed: &mut Option<Fingerprint>,
    ) -> Result<ProcessedImage, ProcessError> {
        validate_upload(upload.media_type.as_deref(), &upload.data)?;
        if upload.data.len() > self.max_upload_bytes {
            return Err(ValidationError::TooLarge {
                limit: self.max_upload_bytes,
            }
            .into());
        }

        let fp = fingerprint(&upload.data);
        *computed = Some(fp.clone());

        let lookup_started = Instant::now();
        match self.results.lookup(&fp).await {
            Ok(Some(cached)) => {
                return Ok(ProcessedImage {
                    fingerprint: fp,
                    filename: filename.to_string(),
                    result: cached.result,
                    processing_time: lookup_started.elapsed().as_secs_f64(),
                    cache_hit: true,
                    timestamp: Utc::now(),
                });
            }
            Ok(None) => {}
            Err(e) => {
                with_metrics(|m| m.record_persistence_failure("lookup"));
                tracing::warn!(
                    fingerprint = %fp.short(),
                    error = %e,
                    "Result lookup failed, treating as a miss"
                );
            }
        }

        if !self.engine.is_ready() {
            return Err(ProcessError::NotReady);
        }

        let analysis_started = Instant::now();
        let analyzed = self.engine.analyze(upload.data.clone()).await;
        let processing_time = analysis_started.elapsed().as_secs_f64();
        with_metrics(|m| m.record_analysis(analyzed.is_ok(), processing_time));
        let result = analyzed?;

        self.background.spawn_insert(
            self.results.clone(),
            fp.clone(),
            filename.to_string(),
            result.clone(),
            processing_time,
        );

        Ok(ProcessedImage {
            fingerprint: fp,
            filename: filename.to_string(),
            result,
            processing_time,
            cache_hit: false,
            timestamp: Utc::now(),
        })
    }
}
