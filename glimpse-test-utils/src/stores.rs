//! Store doubles with injectable failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use glimpse_core::{AuditLogEntry, CachedResult, Fingerprint, InsertOutcome, StorageError};
use glimpse_storage::{AuditLog, InMemoryStore, ResultStore};
use serde_json::Value;

/// In-memory store whose operations can be switched to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    fail_lookup: AtomicBool,
    fail_insert: AtomicBool,
    fail_append: AtomicBool,
    insert_attempts: AtomicUsize,
    append_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.set_fail_lookup(true);
        store.set_fail_insert(true);
        store.set_fail_append(true);
        store
    }

    pub fn set_fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    pub fn append_attempts(&self) -> usize {
        self.append_attempts.load(Ordering::SeqCst)
    }

    /// Records that were actually written.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn unavailable_error(op: &str) -> StorageError {
        StorageError::Unavailable {
            reason: format!("injected {} failure", op),
        }
    }
}

#[async_trait]
impl ResultStore for FailingStore {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<CachedResult>, StorageError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error("lookup"));
        }
        self.inner.lookup(fingerprint).await
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        filename: &str,
        result: &Value,
        processing_time: f64,
    ) -> Result<InsertOutcome, StorageError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error("insert"));
        }
        self.inner
            .insert(fingerprint, filename, result, processing_time)
            .await
    }

    async fn result_count(&self) -> Result<u64, StorageError> {
        self.inner.result_count().await
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error("health check"));
        }
        Ok(())
    }
}

#[async_trait]
impl AuditLog for FailingStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StorageError> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(Self::unavailable_error("append"));
        }
        self.inner.append(entry).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StorageError> {
        self.inner.recent(limit).await
    }

    async fn entry_count(&self) -> Result<u64, StorageError> {
        self.inner.entry_count().await
    }
}
