//! # scriptguard-storage
//!
//! SQLite persistence for ScriptGuard plus a filesystem object store.
//! Implements every row-store trait from `scriptguard-core` on a single
//! mutex-guarded connection. Schema is versioned with `PRAGMA user_version`.

pub mod engine;
pub mod migrations;
pub mod objects;
pub mod pragmas;
pub mod queries;
pub mod schema;

pub use engine::StorageEngine;
pub use objects::FsObjectStorage;

use scriptguard_core::errors::StorageError;

/// Wrap any displayable error as a `StorageError::SqliteError`.
pub fn to_storage_err(message: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: message.to_string(),
    }
}

/// Map a rusqlite error, keeping lock contention distinguishable.
pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if matches!(
                f.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StorageError::DbBusy
        }
        _ => to_storage_err(e),
    }
}
