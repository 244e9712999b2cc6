//! activity_logs table queries. Append-only: there is no update or delete.

use rusqlite::{params, Connection, Row};
use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{ActivityAction, ActivityEntry, ActivityStatus};

use super::{fmt_ts, parse_enum, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "activity_logs";

struct ActivityRow {
    id: String,
    user_id: String,
    action: String,
    item_name: String,
    status: String,
    credits_used: u32,
    details: Option<String>,
    created_at: String,
}

impl ActivityRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            item_name: row.get(3)?,
            status: row.get(4)?,
            credits_used: row.get(5)?,
            details: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    fn into_entry(self) -> Result<ActivityEntry, StorageError> {
        Ok(ActivityEntry {
            action: parse_enum(TABLE, "action", &self.action, ActivityAction::parse)?,
            status: parse_enum(TABLE, "status", &self.status, ActivityStatus::parse)?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            id: self.id,
            user_id: self.user_id,
            item_name: self.item_name,
            credits_used: self.credits_used,
            details: self.details,
        })
    }
}

pub fn append_activity(conn: &Connection, entry: &ActivityEntry) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO activity_logs
         (id, user_id, action, item_name, status, credits_used, details, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.user_id,
            entry.action.as_str(),
            entry.item_name,
            entry.status.as_str(),
            entry.credits_used,
            entry.details,
            fmt_ts(&entry.created_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Newest first, at most `limit` rows.
pub fn recent_activity(
    conn: &Connection,
    owner_id: &str,
    limit: usize,
) -> Result<Vec<ActivityEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, user_id, action, item_name, status, credits_used, details, created_at
             FROM activity_logs WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )
        .map_err(sqlite_err)?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(params![owner_id, limit], ActivityRow::read)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?.into_entry()?);
    }
    Ok(result)
}
