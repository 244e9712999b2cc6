//! encryption_logs and analysis_logs table queries.
//!
//! Findings and suggestions are stored as JSON arrays in TEXT columns.

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{
    AnalysisRecord, EncryptionRecord, ProcessStatus, ProtectionLevel, RecordKind, RiskLevel,
    Vulnerability,
};

use super::{corrupt, fmt_ts, parse_enum, parse_ts, to_count};
use crate::{sqlite_err, to_storage_err};

const ENCRYPTIONS: &str = "encryption_logs";
const ANALYSES: &str = "analysis_logs";

// ─── Encryption records ──────────────────────────────────────────────

struct EncryptionRow {
    id: String,
    user_id: String,
    file_name: String,
    file_type: String,
    protection_level: String,
    license_key_id: Option<String>,
    encrypted_file_path: Option<String>,
    loader_code: Option<String>,
    credits_used: u32,
    status: String,
    expiration_date: String,
    created_at: String,
    updated_at: String,
}

impl EncryptionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            file_name: row.get(2)?,
            file_type: row.get(3)?,
            protection_level: row.get(4)?,
            license_key_id: row.get(5)?,
            encrypted_file_path: row.get(6)?,
            loader_code: row.get(7)?,
            credits_used: row.get(8)?,
            status: row.get(9)?,
            expiration_date: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_record(self) -> Result<EncryptionRecord, StorageError> {
        Ok(EncryptionRecord {
            protection_level: parse_enum(
                ENCRYPTIONS,
                "protection_level",
                &self.protection_level,
                ProtectionLevel::parse,
            )?,
            status: parse_enum(ENCRYPTIONS, "status", &self.status, ProcessStatus::parse)?,
            expiration_date: parse_ts(ENCRYPTIONS, &self.expiration_date)?,
            created_at: parse_ts(ENCRYPTIONS, &self.created_at)?,
            updated_at: parse_ts(ENCRYPTIONS, &self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_type: self.file_type,
            license_key_id: self.license_key_id,
            encrypted_file_path: self.encrypted_file_path,
            loader_code: self.loader_code,
            credits_used: self.credits_used,
        })
    }
}

pub fn insert_encryption_record(
    conn: &Connection,
    record: &EncryptionRecord,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO encryption_logs
         (id, user_id, file_name, file_type, protection_level, license_key_id,
          encrypted_file_path, loader_code, credits_used, status, expiration_date,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            record.id,
            record.user_id,
            record.file_name,
            record.file_type,
            record.protection_level.as_str(),
            record.license_key_id,
            record.encrypted_file_path,
            record.loader_code,
            record.credits_used,
            record.status.as_str(),
            fmt_ts(&record.expiration_date),
            fmt_ts(&record.created_at),
            fmt_ts(&record.updated_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Newest first.
pub fn list_encryption_records(
    conn: &Connection,
    owner_id: &str,
) -> Result<Vec<EncryptionRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, user_id, file_name, file_type, protection_level, license_key_id,
                    encrypted_file_path, loader_code, credits_used, status, expiration_date,
                    created_at, updated_at
             FROM encryption_logs WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![owner_id], EncryptionRow::read)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?.into_record()?);
    }
    Ok(result)
}

pub fn count_completed_encryptions(conn: &Connection, owner_id: &str) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM encryption_logs WHERE user_id = ?1 AND status = 'completed'",
        params![owner_id],
        |row| row.get::<_, i64>(0),
    )
    .map(to_count)
    .map_err(sqlite_err)
}

// ─── Analysis records ────────────────────────────────────────────────

struct AnalysisRow {
    id: String,
    user_id: String,
    file_name: String,
    risk_level: Option<String>,
    vulnerabilities: String,
    suggestions: String,
    credits_used: u32,
    status: String,
    expiration_date: String,
    created_at: String,
    updated_at: String,
}

impl AnalysisRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            file_name: row.get(2)?,
            risk_level: row.get(3)?,
            vulnerabilities: row.get(4)?,
            suggestions: row.get(5)?,
            credits_used: row.get(6)?,
            status: row.get(7)?,
            expiration_date: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }

    fn into_record(self) -> Result<AnalysisRecord, StorageError> {
        let risk_level = self
            .risk_level
            .as_deref()
            .map(|raw| parse_enum(ANALYSES, "risk_level", raw, RiskLevel::parse))
            .transpose()?;
        let vulnerabilities: Vec<Vulnerability> = serde_json::from_str(&self.vulnerabilities)
            .map_err(|e| corrupt(ANALYSES, format!("bad vulnerabilities json: {e}")))?;
        let suggestions: Vec<String> = serde_json::from_str(&self.suggestions)
            .map_err(|e| corrupt(ANALYSES, format!("bad suggestions json: {e}")))?;
        Ok(AnalysisRecord {
            status: parse_enum(ANALYSES, "status", &self.status, ProcessStatus::parse)?,
            expiration_date: parse_ts(ANALYSES, &self.expiration_date)?,
            created_at: parse_ts(ANALYSES, &self.created_at)?,
            updated_at: parse_ts(ANALYSES, &self.updated_at)?,
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            risk_level,
            vulnerabilities,
            suggestions,
            credits_used: self.credits_used,
        })
    }
}

pub fn insert_analysis_record(conn: &Connection, record: &AnalysisRecord) -> Result<(), StorageError> {
    let vulnerabilities = serde_json::to_string(&record.vulnerabilities).map_err(to_storage_err)?;
    let suggestions = serde_json::to_string(&record.suggestions).map_err(to_storage_err)?;
    conn.execute(
        "INSERT INTO analysis_logs
         (id, user_id, file_name, risk_level, vulnerabilities, suggestions, credits_used,
          status, expiration_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id,
            record.user_id,
            record.file_name,
            record.risk_level.map(|r| r.as_str()),
            vulnerabilities,
            suggestions,
            record.credits_used,
            record.status.as_str(),
            fmt_ts(&record.expiration_date),
            fmt_ts(&record.created_at),
            fmt_ts(&record.updated_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Newest first.
pub fn list_analysis_records(
    conn: &Connection,
    owner_id: &str,
) -> Result<Vec<AnalysisRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, user_id, file_name, risk_level, vulnerabilities, suggestions,
                    credits_used, status, expiration_date, created_at, updated_at
             FROM analysis_logs WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![owner_id], AnalysisRow::read)
        .map_err(sqlite_err)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(sqlite_err)?.into_record()?);
    }
    Ok(result)
}

pub fn count_high_risk_analyses(conn: &Connection, owner_id: &str) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM analysis_logs WHERE user_id = ?1 AND risk_level = 'high'",
        params![owner_id],
        |row| row.get::<_, i64>(0),
    )
    .map(to_count)
    .map_err(sqlite_err)
}

// ─── Shared ──────────────────────────────────────────────────────────

pub fn set_record_status(
    conn: &Connection,
    kind: RecordKind,
    record_id: &str,
    status: ProcessStatus,
) -> Result<(), StorageError> {
    let sql = match kind {
        RecordKind::Encryption => {
            "UPDATE encryption_logs SET status = ?2, updated_at = ?3 WHERE id = ?1"
        }
        RecordKind::Analysis => {
            "UPDATE analysis_logs SET status = ?2, updated_at = ?3 WHERE id = ?1"
        }
    };
    conn.execute(sql, params![record_id, status.as_str(), fmt_ts(&Utc::now())])
        .map_err(sqlite_err)?;
    Ok(())
}
