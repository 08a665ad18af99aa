//! Storage configuration loaded from the environment.

use std::path::PathBuf;

/// Which backend serves the result store and audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Lmdb,
    Memory,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lmdb" => Some(Self::Lmdb),
            "memory" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding all database environments.
    pub data_dir: PathBuf,
    /// Environment directory name under `data_dir`.
    pub database_name: String,
    /// Named database holding cached results.
    pub collection_name: String,
    /// Named database holding audit entries.
    pub log_collection_name: String,
    /// LMDB map size in megabytes.
    pub max_size_mb: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Lmdb,
            data_dir: PathBuf::from("./data"),
            database_name: "image_processing_db".to_string(),
            collection_name: "image_results".to_string(),
            log_collection_name: "request_logs".to_string(),
            max_size_mb: 1024,
        }
    }
}

impl StorageConfig {
    /// Create StorageConfig from environment variables.
    ///
    /// Environment variables:
    /// - `GLIMPSE_STORAGE_BACKEND`: "lmdb" or "memory" (default: lmdb)
    /// - `GLIMPSE_DATA_DIR`: Root data directory (default: ./data)
    /// - `DATABASE_NAME`: Environment name (default: image_processing_db)
    /// - `COLLECTION_NAME`: Results database (default: image_results)
    /// - `LOG_COLLECTION_NAME`: Audit database (default: request_logs)
    /// - `GLIMPSE_LMDB_MAX_SIZE_MB`: Map size (default: 1024)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backend = std::env::var("GLIMPSE_STORAGE_BACKEND")
            .ok()
            .and_then(|s| StorageBackend::parse(&s))
            .unwrap_or(defaults.backend);

        let data_dir = std::env::var("GLIMPSE_DATA_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let database_name = non_empty_var("DATABASE_NAME").unwrap_or(defaults.database_name);
        let collection_name = non_empty_var("COLLECTION_NAME").unwrap_or(defaults.collection_name);
        let log_collection_name =
            non_empty_var("LOG_COLLECTION_NAME").unwrap_or(defaults.log_collection_name);

        let max_size_mb = std::env::var("GLIMPSE_LMDB_MAX_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|mb: &usize| *mb > 0)
            .unwrap_or(defaults.max_size_mb);

        Self {
            backend,
            data_dir,
            database_name,
            collection_name,
            log_collection_name,
            max_size_mb,
        }
    }

    /// Directory of the LMDB environment.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_name)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Lmdb);
        assert_eq!(config.database_name, "image_processing_db");
        assert_eq!(config.collection_name, "image_results");
        assert_eq!(config.log_collection_name, "request_logs");
        assert_eq!(config.max_size_mb, 1024);
    }

    #[test]
    fn test_database_path() {
        let config = StorageConfig {
            data_dir: PathBuf::from("/var/lib/glimpse"),
            ..StorageConfig::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/glimpse/image_processing_db")
        );
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(StorageBackend::parse("LMDB"), Some(StorageBackend::Lmdb));
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse(" in-memory "), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("mongo"), None);
    }
}
