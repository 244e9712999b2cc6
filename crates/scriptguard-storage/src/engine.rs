//! `StorageEngine`: SQLite implementation of every ScriptGuard row-store trait.
//!
//! One connection behind a mutex. Every trait method borrows it through
//! `with_conn`; nothing outside this module touches a raw `&Connection`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{
    ActivityEntry, AnalysisRecord, EncryptionRecord, KeyStatus, LicenseKey, ProcessStatus,
    Profile, RecordKind,
};
use scriptguard_core::traits::{
    IActivityLog, IIdentityResolver, ILicenseKeyStore, IOperationLogStore, IProfileStore,
};
use tracing::info;

use crate::queries::{access_tokens, activity, license_keys, operation_logs, profiles};
use crate::{migrations, pragmas, sqlite_err, to_storage_err};

pub struct StorageEngine {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl StorageEngine {
    /// Open a file-backed engine. Applies PRAGMAs and runs migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(sqlite_err)?;
        let engine = Self::init(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "storage engine opened");
        Ok(engine)
    }

    /// Open an in-memory engine (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqlite_err)?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StorageError> {
        pragmas::configure_connection(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn schema_version(&self) -> Result<u32, StorageError> {
        self.with_conn(migrations::current_version)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| to_storage_err("connection mutex poisoned"))?;
        f(&conn)
    }
}

// ─── Profiles ────────────────────────────────────────────────────────

impl IProfileStore for StorageEngine {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError> {
        self.with_conn(|conn| profiles::get_profile(conn, user_id))
    }

    fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.with_conn(|conn| profiles::insert_profile(conn, profile))
    }

    fn try_debit_credits(&self, user_id: &str, amount: u32) -> Result<Option<u32>, StorageError> {
        self.with_conn(|conn| profiles::try_debit_credits(conn, user_id, amount))
    }

    fn rename_once(&self, user_id: &str, new_name: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| profiles::rename_once(conn, user_id, new_name))
    }
}

// ─── License keys ────────────────────────────────────────────────────

impl ILicenseKeyStore for StorageEngine {
    fn get_key(&self, key_id: &str, owner_id: &str) -> Result<Option<LicenseKey>, StorageError> {
        self.with_conn(|conn| license_keys::get_key(conn, key_id, owner_id))
    }

    fn list_keys(&self, owner_id: &str) -> Result<Vec<LicenseKey>, StorageError> {
        self.with_conn(|conn| license_keys::list_keys(conn, owner_id))
    }

    fn insert_key(&self, key: &LicenseKey) -> Result<(), StorageError> {
        self.with_conn(|conn| license_keys::insert_key(conn, key))
    }

    fn set_key_status(
        &self,
        key_id: &str,
        owner_id: &str,
        status: KeyStatus,
    ) -> Result<bool, StorageError> {
        self.with_conn(|conn| license_keys::set_key_status(conn, key_id, owner_id, status))
    }

    fn delete_key(&self, key_id: &str, owner_id: &str) -> Result<bool, StorageError> {
        self.with_conn(|conn| license_keys::delete_key(conn, key_id, owner_id))
    }

    fn increment_scripts_count(&self, key_id: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| license_keys::increment_scripts_count(conn, key_id))
    }

    fn count_active_keys(&self, owner_id: &str) -> Result<usize, StorageError> {
        self.with_conn(|conn| license_keys::count_active_keys(conn, owner_id))
    }
}

// ─── Operation records ───────────────────────────────────────────────

impl IOperationLogStore for StorageEngine {
    fn insert_encryption_record(&self, record: &EncryptionRecord) -> Result<(), StorageError> {
        self.with_conn(|conn| operation_logs::insert_encryption_record(conn, record))
    }

    fn insert_analysis_record(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        self.with_conn(|conn| operation_logs::insert_analysis_record(conn, record))
    }

    fn set_record_status(
        &self,
        kind: RecordKind,
        record_id: &str,
        status: ProcessStatus,
    ) -> Result<(), StorageError> {
        self.with_conn(|conn| operation_logs::set_record_status(conn, kind, record_id, status))
    }

    fn list_encryption_records(
        &self,
        owner_id: &str,
    ) -> Result<Vec<EncryptionRecord>, StorageError> {
        self.with_conn(|conn| operation_logs::list_encryption_records(conn, owner_id))
    }

    fn list_analysis_records(&self, owner_id: &str) -> Result<Vec<AnalysisRecord>, StorageError> {
        self.with_conn(|conn| operation_logs::list_analysis_records(conn, owner_id))
    }

    fn count_completed_encryptions(&self, owner_id: &str) -> Result<usize, StorageError> {
        self.with_conn(|conn| operation_logs::count_completed_encryptions(conn, owner_id))
    }

    fn count_high_risk_analyses(&self, owner_id: &str) -> Result<usize, StorageError> {
        self.with_conn(|conn| operation_logs::count_high_risk_analyses(conn, owner_id))
    }
}

// ─── Activity and identity ───────────────────────────────────────────

impl IActivityLog for StorageEngine {
    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StorageError> {
        self.with_conn(|conn| activity::append_activity(conn, entry))
    }

    fn recent_activity(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        self.with_conn(|conn| activity::recent_activity(conn, owner_id, limit))
    }
}

impl IIdentityResolver for StorageEngine {
    fn resolve_bearer(&self, token: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| access_tokens::resolve_bearer(conn, token))
    }

    fn issue_access_token(&self, user_id: &str, token: &str) -> Result<(), StorageError> {
        self.with_conn(|conn| access_tokens::issue_access_token(conn, user_id, token))
    }
}
