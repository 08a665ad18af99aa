//! Glimpse Storage - Result Store and Audit Log
//!
//! Defines the two persistence collaborators of the request pipeline and
//! ships two backends for each:
//! - `LmdbStore`: LMDB via heed, one environment with a results database
//!   keyed by fingerprint and an audit database keyed by UUIDv7
//! - `InMemoryStore`: `RwLock`-guarded maps for tests and local runs

pub mod config;
pub mod lmdb;
pub mod memory;

pub use config::{StorageBackend, StorageConfig};
pub use lmdb::{LmdbStore, LmdbStoreError};
pub use memory::InMemoryStore;

use std::sync::Arc;

use async_trait::async_trait;
use glimpse_core::{AuditLogEntry, CachedResult, Fingerprint, InsertOutcome, StorageError};
use serde_json::Value;

// ============================================================================
// TRAITS
// ============================================================================

/// Persistent `fingerprint -> CachedResult` mapping.
///
/// Implementations must enforce fingerprint uniqueness: inserting a
/// fingerprint that is already present returns `AlreadyPresent` and leaves
/// the stored record untouched.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Point lookup. A missing record is `Ok(None)`, never an error.
    async fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedResult>, StorageError>;

    /// Persist a freshly computed result.
    async fn insert(
        &self,
        fingerprint: &Fingerprint,
        filename: &str,
        result: &Value,
        processing_time: f64,
    ) -> Result<InsertOutcome, StorageError>;

    /// Number of stored results.
    async fn result_count(&self) -> Result<u64, StorageError>;

    /// Cheap reachability probe used by readiness checks.
    async fn health_check(&self) -> Result<(), StorageError>;
}

/// Append-only record of request outcomes.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), StorageError>;

    /// Most recent entries, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, StorageError>;

    async fn entry_count(&self) -> Result<u64, StorageError>;
}

/// Both collaborators, backed by the same store.
#[derive(Clone)]
pub struct StorageHandles {
    pub results: Arc<dyn ResultStore>,
    pub audit: Arc<dyn AuditLog>,
}

impl StorageHandles {
    /// Share one backend for results and audit entries.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ResultStore + AuditLog + 'static,
    {
        Self {
            results: store.clone(),
            audit: store,
        }
    }
}

/// Open the backend selected by `config`.
pub fn open(config: &StorageConfig) -> Result<StorageHandles, StorageError> {
    match config.backend {
        StorageBackend::Lmdb => {
            let store = LmdbStore::open(config).map_err(StorageError::from)?;
            tracing::info!(
                path = %config.database_path().display(),
                results = %config.collection_name,
                audit = %config.log_collection_name,
                "Opened LMDB result store"
            );
            Ok(StorageHandles::shared(Arc::new(store)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory result store; results are lost on restart");
            Ok(StorageHandles::shared(Arc::new(InMemoryStore::new())))
        }
    }
}
