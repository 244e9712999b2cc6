//! Per-table query functions. Rows are validated into core models here;
//! a row that does not parse is a `CorruptRow`, never a silent default.

pub mod access_tokens;
pub mod activity;
pub mod license_keys;
pub mod operation_logs;
pub mod profiles;

use chrono::{DateTime, SecondsFormat, Utc};
use scriptguard_core::errors::StorageError;

/// Fixed-width RFC 3339 so text ordering matches time ordering.
pub(crate) fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(table: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("bad timestamp {raw:?}: {e}")))
}

pub(crate) fn parse_enum<T>(
    table: &str,
    column: &str,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, StorageError> {
    parse(raw).ok_or_else(|| corrupt(table, format!("unknown {column} {raw:?}")))
}

pub(crate) fn corrupt(table: &str, message: String) -> StorageError {
    StorageError::CorruptRow {
        table: table.to_string(),
        message,
    }
}

pub(crate) fn to_count(n: i64) -> usize {
    usize::try_from(n).unwrap_or(0)
}
