//! In-memory result store and audit log.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use glimpse_core::{AuditLogEntry, CachedResult, Fingerprint, InsertOutcome, StorageError};
use serde_json::Value;

use crate::{AuditLog, ResultStore};

/// Process-local store with the same contracts as the LMDB backend.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    results: Arc<RwLock<HashMap<Fingerprint, CachedResult>>>,
    audit: Arc<RwLock<Vec<AuditLogEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every audit entry, oldest first.
    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Snapshot of every stored result.
    pub fn stored_results(&self) -> Vec<CachedResult> {
        self.results
            .read()
            .map(|results| results.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<CachedResult>, StorageError> {
        let results = self.results.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(results.get(fingerprint).cloned())
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        filename: &str,
        result: &Value,
        processing_time: f64,
    ) -> Result<InsertOutcome, StorageError> {
        let mut results = self.results.write().map_err(|_| StorageError::LockPoisoned)?;
        if results.contains_key(fingerprint) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        results.insert(
            fingerprint.clone(),
            CachedResult::new(fingerprint.clone(), filename, result.clone(), processing_time),
        );
        Ok(InsertOutcome::Inserted)
    }

    async fn result_count(&self) -> Result<u64, StorageError> {
        let results = self.results.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(results.len() as u64)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.results.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StorageError> {
        let mut audit = self.audit.write().map_err(|_| StorageError::LockPoisoned)?;
        audit.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StorageError> {
        let audit = self.audit.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }

    async fn entry_count(&self) -> Result<u64, StorageError> {
        let audit = self.audit.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(audit.len() as u64)
    }
}
