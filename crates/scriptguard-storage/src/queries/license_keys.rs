//! license_keys table queries. Every lookup is scoped by owner.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{KeyStatus, LicenseKey};

use super::{fmt_ts, parse_enum, parse_ts, to_count};
use crate::sqlite_err;

const TABLE: &str = "license_keys";
const COLUMNS: &str =
    "id, user_id, key_name, key_value, status, scripts_count, created_at, updated_at";

struct KeyRow {
    id: String,
    user_id: String,
    key_name: String,
    key_value: String,
    status: String,
    scripts_count: u32,
    created_at: String,
    updated_at: String,
}

impl KeyRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            key_name: row.get(2)?,
            key_value: row.get(3)?,
            status: row.get(4)?,
            scripts_count: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_key(self) -> Result<LicenseKey, StorageError> {
        Ok(LicenseKey {
            status: parse_enum(TABLE, "status", &self.status, KeyStatus::parse)?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            updated_at: parse_ts(TABLE, &self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            key_name: self.key_name,
            key_value: self.key_value,
            scripts_count: self.scripts_count,
        })
    }
}

pub fn get_key(
    conn: &Connection,
    key_id: &str,
    owner_id: &str,
) -> Result<Option<LicenseKey>, StorageError> {
    let row = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM license_keys WHERE id = ?1 AND user_id = ?2"),
            params![key_id, owner_id],
            KeyRow::read,
        )
        .optional()
        .map_err(sqlite_err)?;
    row.map(KeyRow::into_key).transpose()
}

/// Newest first.
pub fn list_keys(conn: &Connection, owner_id: &str) -> Result<Vec<LicenseKey>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM license_keys WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![owner_id], KeyRow::read)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?.into_key()?);
    }
    Ok(result)
}

pub fn insert_key(conn: &Connection, key: &LicenseKey) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO license_keys
         (id, user_id, key_name, key_value, status, scripts_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            key.id,
            key.user_id,
            key.key_name,
            key.key_value,
            key.status.as_str(),
            key.scripts_count,
            fmt_ts(&key.created_at),
            fmt_ts(&key.updated_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn set_key_status(
    conn: &Connection,
    key_id: &str,
    owner_id: &str,
    status: KeyStatus,
) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE license_keys SET status = ?3, updated_at = ?4
             WHERE id = ?1 AND user_id = ?2",
            params![key_id, owner_id, status.as_str(), fmt_ts(&Utc::now())],
        )
        .map_err(sqlite_err)?;
    Ok(changed == 1)
}

pub fn delete_key(conn: &Connection, key_id: &str, owner_id: &str) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "DELETE FROM license_keys WHERE id = ?1 AND user_id = ?2",
            params![key_id, owner_id],
        )
        .map_err(sqlite_err)?;
    Ok(changed == 1)
}

/// Store-side increment; never read-modify-write.
pub fn increment_scripts_count(conn: &Connection, key_id: &str) -> Result<(), StorageError> {
    conn.execute(
        "UPDATE license_keys SET scripts_count = scripts_count + 1, updated_at = ?2
         WHERE id = ?1",
        params![key_id, fmt_ts(&Utc::now())],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn count_active_keys(conn: &Connection, owner_id: &str) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM license_keys WHERE user_id = ?1 AND status = 'active'",
        params![owner_id],
        |row| row.get::<_, i64>(0),
    )
    .map(to_count)
    .map_err(sqlite_err)
}
