//! Storage-layer errors for the row store and the object store.

use super::error_code::{self, ScriptGuardErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database busy (another operation in progress)")]
    DbBusy,

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },

    #[error("Object write failed for {path}: {message}")]
    ObjectWriteFailed { path: String, message: String },

    #[error("Object read failed for {path}: {message}")]
    ObjectReadFailed { path: String, message: String },

    #[error("Invalid object path: {path}")]
    InvalidObjectPath { path: String },
}

impl ScriptGuardErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbBusy => error_code::DB_BUSY,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::ObjectWriteFailed { .. } | Self::InvalidObjectPath { .. } => {
                error_code::OBJECT_WRITE_FAILED
            }
            Self::ObjectReadFailed { .. } => error_code::OBJECT_READ_FAILED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
