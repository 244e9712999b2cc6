//! Schema versioning using `PRAGMA user_version`.
//!
//! Each version bump is one const SQL string applied inside a transaction
//! together with the version write.

use rusqlite::Connection;
use scriptguard_core::errors::StorageError;
use tracing::info;

use crate::schema::SCHEMA_V1;

/// Current schema version. Bump this when adding a migration.
pub const CURRENT_VERSION: u32 = 1;

const MIGRATIONS: &[(u32, &str)] = &[(1, SCHEMA_V1)];

pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))
        .map_err(crate::sqlite_err)
}

/// Apply every pending migration. Returns the resulting version.
pub fn run_migrations(conn: &Connection) -> Result<u32, StorageError> {
    let start = current_version(conn)?;
    if start >= CURRENT_VERSION {
        return Ok(start);
    }

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > start) {
        info!(from = version - 1, to = version, "migrating schema");
        let failed = |e: rusqlite::Error| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        };
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;"
        ))
        .map_err(|e| {
            let _ = conn.execute_batch("ROLLBACK;");
            failed(e)
        })?;
    }

    let end = current_version(conn)?;
    info!(from = start, to = end, "schema migration complete");
    Ok(end)
}
