//! Storage configuration.

use serde::{Deserialize, Serialize};

/// Which row-store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Configuration for the row store and the object store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// SQLite database file. Ignored by the memory backend.
    pub database_path: String,
    /// Root directory for stored artifacts. Ignored by the memory backend.
    pub object_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_path: "scriptguard.db".to_string(),
            object_root: "encrypted-files".to_string(),
        }
    }
}
