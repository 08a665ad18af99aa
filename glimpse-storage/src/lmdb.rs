//! LMDB-backed result store and audit log.
//!
//! Uses the heed crate (Rust bindings for LMDB). One environment holds two
//! named databases:
//! - results: fingerprint hex -> JSON `CachedResult`
//! - audit: UUIDv7 bytes -> JSON `AuditLogEntry`
//!
//! UUIDv7 keys sort by creation time, so reverse iteration yields the newest
//! audit entries first.
//!
//! # Uniqueness
//!
//! LMDB serializes write transactions. `insert` checks for an existing key
//! and writes inside the same write transaction, so two racing inserts for
//! one fingerprint persist exactly one record.

use std::path::Path;

use async_trait::async_trait;
use glimpse_core::{AuditLogEntry, CachedResult, Fingerprint, InsertOutcome, StorageError};
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use serde_json::Value;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::{AuditLog, ResultStore};

/// Error type for opening the LMDB environment.
#[derive(Debug, thiserror::Error)]
pub enum LmdbStoreError {
    /// Failed to open or create the LMDB environment.
    #[error("Failed to open LMDB environment: {0}")]
    EnvOpen(String),

    /// Failed to open a named database within the environment.
    #[error("Failed to open database {name}: {reason}")]
    DbOpen { name: String, reason: String },

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LmdbStoreError> for StorageError {
    fn from(e: LmdbStoreError) -> Self {
        StorageError::Unavailable {
            reason: e.to_string(),
        }
    }
}

fn txn_error(e: heed::Error) -> StorageError {
    StorageError::TransactionFailed {
        reason: e.to_string(),
    }
}

/// LMDB store serving both `ResultStore` and `AuditLog`.
pub struct LmdbStore {
    env: Env,
    results: Database<Bytes, Bytes>,
    audit: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open (or create) the environment described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, LmdbStoreError> {
        Self::open_at(
            config.database_path(),
            config.max_size_mb,
            &config.collection_name,
            &config.log_collection_name,
        )
    }

    /// Open (or create) an environment at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the environment
    /// cannot be opened, or either named database cannot be created.
    pub fn open_at<P: AsRef<Path>>(
        path: P,
        max_size_mb: usize,
        results_name: &str,
        audit_name: &str,
    ) -> Result<Self, LmdbStoreError> {
        std::fs::create_dir_all(&path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(2)
                .open(path.as_ref())
        }
        .map_err(|e| LmdbStoreError::EnvOpen(e.to_string()))?;

        let mut wtxn = env
            .write_txn()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        let results: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, Some(results_name))
            .map_err(|e| LmdbStoreError::DbOpen {
                name: results_name.to_string(),
                reason: e.to_string(),
            })?;

        let audit: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, Some(audit_name))
            .map_err(|e| LmdbStoreError::DbOpen {
                name: audit_name.to_string(),
                reason: e.to_string(),
            })?;

        wtxn.commit()
            .map_err(|e| LmdbStoreError::Transaction(e.to_string()))?;

        Ok(Self {
            env,
            results,
            audit,
        })
    }

    fn decode_result(key: &Fingerprint, bytes: &[u8]) -> Result<CachedResult, StorageError> {
        serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupted {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ResultStore for LmdbStore {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<CachedResult>, StorageError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;

        match self.results.get(&rtxn, fingerprint.as_bytes()).map_err(txn_error)? {
            Some(bytes) => Self::decode_result(fingerprint, bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        filename: &str,
        result: &Value,
        processing_time: f64,
    ) -> Result<InsertOutcome, StorageError> {
        let record =
            CachedResult::new(fingerprint.clone(), filename, result.clone(), processing_time);
        let value_bytes = serde_json::to_vec(&record).map_err(|e| StorageError::Serialization {
            reason: e.to_string(),
        })?;

        let mut wtxn = self.env.write_txn().map_err(txn_error)?;

        let exists = self
            .results
            .get(&wtxn, fingerprint.as_bytes())
            .map_err(txn_error)?
            .is_some();
        if exists {
            // Dropping the transaction aborts it.
            return Ok(InsertOutcome::AlreadyPresent);
        }

        self.results
            .put(&mut wtxn, fingerprint.as_bytes(), &value_bytes)
            .map_err(txn_error)?;

        wtxn.commit().map_err(txn_error)?;

        Ok(InsertOutcome::Inserted)
    }

    async fn result_count(&self) -> Result<u64, StorageError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        self.results.len(&rtxn).map_err(txn_error)
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        self.results.len(&rtxn).map_err(txn_error)?;
        Ok(())
    }
}

#[async_trait]
impl AuditLog for LmdbStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StorageError> {
        let key = Uuid::now_v7();
        let value_bytes = serde_json::to_vec(entry).map_err(|e| StorageError::Serialization {
            reason: e.to_string(),
        })?;

        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        self.audit
            .put(&mut wtxn, key.as_bytes().as_slice(), &value_bytes)
            .map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;

        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StorageError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        let iter = self.audit.rev_iter(&rtxn).map_err(txn_error)?;

        let mut entries = Vec::with_capacity(limit.min(256));
        for item in iter.take(limit) {
            let (key, bytes) = item.map_err(txn_error)?;
            let entry: AuditLogEntry =
                serde_json::from_slice(bytes).map_err(|e| StorageError::Corrupted {
                    key: key_label(key),
                    reason: e.to_string(),
                })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    async fn entry_count(&self) -> Result<u64, StorageError> {
        let rtxn = self.env.read_txn().map_err(txn_error)?;
        self.audit.len(&rtxn).map_err(txn_error)
    }
}

fn key_label(key: &[u8]) -> String {
    Uuid::from_slice(key)
        .map(|id| id.to_string())
        .unwrap_or_else(|_| format!("{:?}", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_core::{fingerprint, RequestStatus};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbStore::open_at(temp_dir.path(), 10, "image_results", "request_logs")
            .expect("store creation should succeed");
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_lookup_missing_is_none() {
        let (store, _temp_dir) = create_test_store();
        let found = store
            .lookup(&fingerprint(b"nothing here"))
            .await
            .expect("lookup should succeed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let (store, _temp_dir) = create_test_store();
        let fp = fingerprint(b"image bytes");
        let payload = json!({"keypoints": 12, "descriptors": [12, 128]});

        let outcome = store
            .insert(&fp, "cat.jpg", &payload, 0.42)
            .await
            .expect("insert should succeed");
        assert_eq!(outcome, InsertOutcome::Inserted);

        let record = store
            .lookup(&fp)
            .await
            .expect("lookup should succeed")
            .expect("record should exist");
        assert_eq!(record.fingerprint, fp);
        assert_eq!(record.filename, "cat.jpg");
        assert_eq!(record.result, payload);
        assert_eq!(record.processing_time, 0.42);
        assert!(!record.cache_hit);
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_first_record() {
        let (store, _temp_dir) = create_test_store();
        let fp = fingerprint(b"same content");

        store
            .insert(&fp, "first.jpg", &json!({"keypoints": 1}), 1.0)
            .await
            .expect("first insert should succeed");
        let outcome = store
            .insert(&fp, "second.jpg", &json!({"keypoints": 2}), 2.0)
            .await
            .expect("second insert should succeed");
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);

        let record = store
            .lookup(&fp)
            .await
            .expect("lookup should succeed")
            .expect("record should exist");
        assert_eq!(record.filename, "first.jpg");
        assert_eq!(record.result, json!({"keypoints": 1}));
        assert_eq!(store.result_count().await.expect("count should succeed"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_persist_one_record() {
        let (store, _temp_dir) = create_test_store();
        let store = Arc::new(store);
        let fp = fingerprint(b"racing content");

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let fp = fp.clone();
                tokio::spawn(async move {
                    store
                        .insert(&fp, &format!("copy-{i}.jpg"), &json!({"keypoints": 5}), 0.1)
                        .await
                })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            let outcome = handle
                .await
                .expect("task should not panic")
                .expect("insert should succeed");
            if outcome == InsertOutcome::Inserted {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.result_count().await.expect("count should succeed"), 1);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let fp = fingerprint(b"durable");
        {
            let store = LmdbStore::open_at(temp_dir.path(), 10, "image_results", "request_logs")
                .expect("store creation should succeed");
            store
                .insert(&fp, "d.png", &json!({"keypoints": 0}), 0.0)
                .await
                .expect("insert should succeed");
        }

        let store = LmdbStore::open_at(temp_dir.path(), 10, "image_results", "request_logs")
            .expect("reopen should succeed");
        assert!(store.lookup(&fp).await.expect("lookup should succeed").is_some());
    }

    #[tokio::test]
    async fn test_audit_append_and_recent_newest_first() {
        let (store, _temp_dir) = create_test_store();
        let fp = fingerprint(b"logged");

        store
            .append(&AuditLogEntry::success("/process-image", &fp, "one.jpg", false, 0.3))
            .await
            .expect("append should succeed");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store
            .append(&AuditLogEntry::success("/process-image", &fp, "two.jpg", true, 0.001))
            .await
            .expect("append should succeed");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        store
            .append(&AuditLogEntry::error("/process-image", None, "three.jpg"))
            .await
            .expect("append should succeed");

        assert_eq!(store.entry_count().await.expect("count should succeed"), 3);

        let recent = store.recent(2).await.expect("recent should succeed");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].filename, "three.jpg");
        assert_eq!(recent[0].status, RequestStatus::Error);
        assert_eq!(recent[0].fingerprint, "unknown");
        assert_eq!(recent[1].filename, "two.jpg");
        assert!(recent[1].cache_hit);
    }

    #[tokio::test]
    async fn test_audit_and_results_are_independent() {
        let (store, _temp_dir) = create_test_store();
        store
            .append(&AuditLogEntry::error("/process-image", None, "x.jpg"))
            .await
            .expect("append should succeed");

        assert_eq!(store.result_count().await.expect("count should succeed"), 0);
        store.health_check().await.expect("health check should succeed");
    }
}
