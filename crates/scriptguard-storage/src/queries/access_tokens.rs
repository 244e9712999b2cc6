//! access_tokens table queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use scriptguard_core::errors::StorageError;

use super::fmt_ts;
use crate::sqlite_err;

pub fn resolve_bearer(conn: &Connection, token: &str) -> Result<Option<String>, StorageError> {
    conn.query_row(
        "SELECT user_id FROM access_tokens WHERE token = ?1",
        params![token],
        |row| row.get(0),
    )
    .optional()
    .map_err(sqlite_err)
}

pub fn issue_access_token(conn: &Connection, user_id: &str, token: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO access_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, user_id, fmt_ts(&Utc::now())],
    )
    .map_err(sqlite_err)?;
    Ok(())
}
