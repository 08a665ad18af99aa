//! Deferred persistence.
//!
//! Result inserts and audit appends run after the response is produced.
//! Every task is tracked so shutdown can wait for pending writes, and
//! failures are logged and counted but never reach a caller.

use std::sync::Arc;
use std::time::Duration;

use glimpse_core::{AuditLogEntry, Fingerprint, InsertOutcome};
use glimpse_storage::{AuditLog, ResultStore};
use serde_json::Value;
use tokio_util::task::TaskTracker;

use crate::telemetry::metrics::with_metrics;

/// Tracks fire-and-forget persistence writes.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes still in flight.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Schedule a result insert.
    pub fn spawn_insert(
        &self,
        store: Arc<dyn ResultStore>,
        fingerprint: Fingerprint,
        filename: String,
        result: Value,
        processing_time: f64,
    ) {
        self.tracker.spawn(async move {
            match store
                .insert(&fingerprint, &filename, &result, processing_time)
                .await
            {
                Ok(InsertOutcome::Inserted) => {
                    tracing::debug!(fingerprint = %fingerprint.short(), "Stored result");
                }
                Ok(InsertOutcome::AlreadyPresent) => {
                    tracing::debug!(
                        fingerprint = %fingerprint.short(),
                        "Result already stored by a concurrent request"
                    );
                }
                Err(e) => {
                    with_metrics(|m| m.record_persistence_failure("insert"));
                    tracing::warn!(
                        fingerprint = %fingerprint.short(),
                        error = %e,
                        "Failed to store result"
                    );
                }
            }
        });
    }

    /// Schedule an audit log append.
    pub fn spawn_audit(&self, audit: Arc<dyn AuditLog>, entry: AuditLogEntry) {
        self.tracker.spawn(async move {
            if let Err(e) = audit.append(&entry).await {
                with_metrics(|m| m.record_persistence_failure("append"));
                tracing::warn!(
                    endpoint = %entry.endpoint,
                    status = entry.status.as_str(),
                    error = %e,
                    "Failed to write audit log entry"
                );
            }
        });
    }

    /// Wait until every write scheduled so far has finished.
    ///
    /// The tracker stays usable afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait up to `grace` for pending writes. Returns `false` on timeout.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for pending persistence writes");
        }
        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    pending = self.tracker.len(),
                    grace_ms = grace.as_millis() as u64,
                    "Shutdown grace period elapsed with writes still pending"
                );
                false
            }
        }
    }
}
