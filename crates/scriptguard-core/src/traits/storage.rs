//! Storage traits: the seams to the row store and the object store.
//!
//! The row store is split by table the same way the SQLite engine splits its
//! query modules. `IScriptGuardStorage` bundles them so callers hold a single
//! trait object.
//!
//! Owner scoping is part of each contract: every lookup that takes an
//! `owner_id` must return nothing for rows belonging to someone else.

pub mod in_memory;

pub use in_memory::{InMemoryObjectStorage, InMemoryStorage};

use crate::errors::StorageError;
use crate::models::{
    ActivityEntry, AnalysisRecord, EncryptionRecord, KeyStatus, LicenseKey, ProcessStatus,
    Profile, RecordKind,
};

// ─── Profiles ────────────────────────────────────────────────────────

pub trait IProfileStore: Send + Sync {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError>;

    fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    /// Atomically subtract `amount` if and only if the balance covers it.
    /// Returns the new balance, or `None` when the balance was too low
    /// (or the profile does not exist). Never drives credits below zero.
    fn try_debit_credits(&self, user_id: &str, amount: u32) -> Result<Option<u32>, StorageError>;

    /// Set the display name if the one-time rename is still unused.
    /// Returns false when the rename was already spent.
    fn rename_once(&self, user_id: &str, new_name: &str) -> Result<bool, StorageError>;
}

// ─── License keys ────────────────────────────────────────────────────

pub trait ILicenseKeyStore: Send + Sync {
    fn get_key(&self, key_id: &str, owner_id: &str) -> Result<Option<LicenseKey>, StorageError>;

    /// Newest first.
    fn list_keys(&self, owner_id: &str) -> Result<Vec<LicenseKey>, StorageError>;

    fn insert_key(&self, key: &LicenseKey) -> Result<(), StorageError>;

    /// Returns false if no such key exists for the owner.
    fn set_key_status(
        &self,
        key_id: &str,
        owner_id: &str,
        status: KeyStatus,
    ) -> Result<bool, StorageError>;

    /// Returns false if no such key exists for the owner.
    fn delete_key(&self, key_id: &str, owner_id: &str) -> Result<bool, StorageError>;

    /// `scripts_count += 1`, as a single store-side update.
    fn increment_scripts_count(&self, key_id: &str) -> Result<(), StorageError>;

    fn count_active_keys(&self, owner_id: &str) -> Result<usize, StorageError>;
}

// ─── Operation records ───────────────────────────────────────────────

pub trait IOperationLogStore: Send + Sync {
    fn insert_encryption_record(&self, record: &EncryptionRecord) -> Result<(), StorageError>;

    fn insert_analysis_record(&self, record: &AnalysisRecord) -> Result<(), StorageError>;

    fn set_record_status(
        &self,
        kind: RecordKind,
        record_id: &str,
        status: ProcessStatus,
    ) -> Result<(), StorageError>;

    /// Newest first.
    fn list_encryption_records(&self, owner_id: &str)
        -> Result<Vec<EncryptionRecord>, StorageError>;

    /// Newest first.
    fn list_analysis_records(&self, owner_id: &str) -> Result<Vec<AnalysisRecord>, StorageError>;

    fn count_completed_encryptions(&self, owner_id: &str) -> Result<usize, StorageError>;

    fn count_high_risk_analyses(&self, owner_id: &str) -> Result<usize, StorageError>;
}

// ─── Activity log ────────────────────────────────────────────────────

pub trait IActivityLog: Send + Sync {
    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StorageError>;

    /// Newest first, at most `limit` entries.
    fn recent_activity(&self, owner_id: &str, limit: usize)
        -> Result<Vec<ActivityEntry>, StorageError>;
}

// ─── Identity ────────────────────────────────────────────────────────

/// Bearer credential → user id. Stands in for the managed backend's
/// "get current user".
pub trait IIdentityResolver: Send + Sync {
    fn resolve_bearer(&self, token: &str) -> Result<Option<String>, StorageError>;

    fn issue_access_token(&self, user_id: &str, token: &str) -> Result<(), StorageError>;
}

/// Everything the orchestrator needs from the row store.
pub trait IScriptGuardStorage:
    IProfileStore + ILicenseKeyStore + IOperationLogStore + IActivityLog + IIdentityResolver
{
}

impl<T> IScriptGuardStorage for T where
    T: IProfileStore + ILicenseKeyStore + IOperationLogStore + IActivityLog + IIdentityResolver
{
}

// ─── Object storage ──────────────────────────────────────────────────

/// Blob storage for encoded artifacts. Paths are `/`-separated and relative.
pub trait IObjectStorage: Send + Sync {
    fn put_object(&self, path: &str, bytes: &[u8], content_type: &str)
        -> Result<(), StorageError>;

    fn get_object(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError>;
}
