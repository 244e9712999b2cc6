//! Connection PRAGMAs. Applied once, right after opening.

use rusqlite::Connection;
use scriptguard_core::errors::StorageError;

use crate::sqlite_err;

/// WAL, foreign keys and a busy timeout for lock contention.
pub fn configure_connection(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA temp_store = MEMORY;
        ",
    )
    .map_err(sqlite_err)
}
