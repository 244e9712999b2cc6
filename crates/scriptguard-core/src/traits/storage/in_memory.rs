//! `InMemoryStorage`: in-process implementation of every storage trait.
//!
//! Backs the `memory` storage backend and the orchestrator tests. Failure
//! switches let tests drive the post-persistence error paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use super::{
    IActivityLog, IIdentityResolver, ILicenseKeyStore, IObjectStorage, IOperationLogStore,
    IProfileStore,
};
use crate::errors::StorageError;
use crate::models::{
    ActivityEntry, AnalysisRecord, EncryptionRecord, KeyStatus, LicenseKey, ProcessStatus,
    Profile, RecordKind, RiskLevel,
};

#[derive(Default)]
struct State {
    profiles: HashMap<String, Profile>,
    // Vecs keep insertion order so "newest first" is a reverse walk.
    keys: Vec<LicenseKey>,
    encryptions: Vec<EncryptionRecord>,
    analyses: Vec<AnalysisRecord>,
    activity: Vec<ActivityEntry>,
    tokens: HashMap<String, String>,
}

/// In-memory row store.
#[derive(Default)]
pub struct InMemoryStorage {
    state: Mutex<State>,
    fail_record_writes: AtomicBool,
    fail_activity_writes: AtomicBool,
    fail_counter_updates: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make record inserts fail with a storage error.
    pub fn set_fail_record_writes(&self, fail: bool) {
        self.fail_record_writes.store(fail, Ordering::SeqCst);
    }

    /// Make activity appends fail with a storage error.
    pub fn set_fail_activity_writes(&self, fail: bool) {
        self.fail_activity_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `increment_scripts_count` fail with a storage error.
    pub fn set_fail_counter_updates(&self, fail: bool) {
        self.fail_counter_updates.store(fail, Ordering::SeqCst);
    }

    /// Overwrite a profile's balance without going through the debit path.
    pub fn set_credits(&self, user_id: &str, credits: u32) {
        if let Some(profile) = self.lock().profiles.get_mut(user_id) {
            profile.credits = credits;
        }
    }

    /// Every activity entry for the owner, oldest first.
    pub fn all_activity(&self, owner_id: &str) -> Vec<ActivityEntry> {
        self.lock()
            .activity
            .iter()
            .filter(|e| e.user_id == owner_id)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the maps themselves are still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected(flag: &AtomicBool, what: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::SqliteError {
                message: format!("injected failure: {what}"),
            })
        } else {
            Ok(())
        }
    }
}

impl IProfileStore for InMemoryStorage {
    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StorageError> {
        Ok(self.lock().profiles.get(user_id).cloned())
    }

    fn insert_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        self.lock()
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    fn try_debit_credits(&self, user_id: &str, amount: u32) -> Result<Option<u32>, StorageError> {
        let mut state = self.lock();
        let Some(profile) = state.profiles.get_mut(user_id) else {
            return Ok(None);
        };
        if profile.credits < amount {
            return Ok(None);
        }
        profile.credits -= amount;
        profile.updated_at = Utc::now();
        Ok(Some(profile.credits))
    }

    fn rename_once(&self, user_id: &str, new_name: &str) -> Result<bool, StorageError> {
        let mut state = self.lock();
        match state.profiles.get_mut(user_id) {
            Some(profile) if !profile.name_change_used => {
                profile.name = new_name.to_string();
                profile.name_change_used = true;
                profile.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl ILicenseKeyStore for InMemoryStorage {
    fn get_key(&self, key_id: &str, owner_id: &str) -> Result<Option<LicenseKey>, StorageError> {
        Ok(self
            .lock()
            .keys
            .iter()
            .find(|k| k.id == key_id && k.user_id == owner_id)
            .cloned())
    }

    fn list_keys(&self, owner_id: &str) -> Result<Vec<LicenseKey>, StorageError> {
        Ok(self
            .lock()
            .keys
            .iter()
            .rev()
            .filter(|k| k.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn insert_key(&self, key: &LicenseKey) -> Result<(), StorageError> {
        self.lock().keys.push(key.clone());
        Ok(())
    }

    fn set_key_status(
        &self,
        key_id: &str,
        owner_id: &str,
        status: KeyStatus,
    ) -> Result<bool, StorageError> {
        let mut state = self.lock();
        match state
            .keys
            .iter_mut()
            .find(|k| k.id == key_id && k.user_id == owner_id)
        {
            Some(key) => {
                key.status = status;
                key.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_key(&self, key_id: &str, owner_id: &str) -> Result<bool, StorageError> {
        let mut state = self.lock();
        let before = state.keys.len();
        state
            .keys
            .retain(|k| !(k.id == key_id && k.user_id == owner_id));
        Ok(state.keys.len() != before)
    }

    fn increment_scripts_count(&self, key_id: &str) -> Result<(), StorageError> {
        Self::injected(&self.fail_counter_updates, "increment_scripts_count")?;
        if let Some(key) = self.lock().keys.iter_mut().find(|k| k.id == key_id) {
            key.scripts_count += 1;
            key.updated_at = Utc::now();
        }
        Ok(())
    }

    fn count_active_keys(&self, owner_id: &str) -> Result<usize, StorageError> {
        Ok(self
            .lock()
            .keys
            .iter()
            .filter(|k| k.user_id == owner_id && k.status == KeyStatus::Active)
            .count())
    }
}

impl IOperationLogStore for InMemoryStorage {
    fn insert_encryption_record(&self, record: &EncryptionRecord) -> Result<(), StorageError> {
        Self::injected(&self.fail_record_writes, "insert_encryption_record")?;
        self.lock().encryptions.push(record.clone());
        Ok(())
    }

    fn insert_analysis_record(&self, record: &AnalysisRecord) -> Result<(), StorageError> {
        Self::injected(&self.fail_record_writes, "insert_analysis_record")?;
        self.lock().analyses.push(record.clone());
        Ok(())
    }

    fn set_record_status(
        &self,
        kind: RecordKind,
        record_id: &str,
        status: ProcessStatus,
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        let now = Utc::now();
        match kind {
            RecordKind::Encryption => {
                if let Some(r) = state.encryptions.iter_mut().find(|r| r.id == record_id) {
                    r.status = status;
                    r.updated_at = now;
                }
            }
            RecordKind::Analysis => {
                if let Some(r) = state.analyses.iter_mut().find(|r| r.id == record_id) {
                    r.status = status;
                    r.updated_at = now;
                }
            }
        }
        Ok(())
    }

    fn list_encryption_records(
        &self,
        owner_id: &str,
    ) -> Result<Vec<EncryptionRecord>, StorageError> {
        Ok(self
            .lock()
            .encryptions
            .iter()
            .rev()
            .filter(|r| r.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn list_analysis_records(&self, owner_id: &str) -> Result<Vec<AnalysisRecord>, StorageError> {
        Ok(self
            .lock()
            .analyses
            .iter()
            .rev()
            .filter(|r| r.user_id == owner_id)
            .cloned()
            .collect())
    }

    fn count_completed_encryptions(&self, owner_id: &str) -> Result<usize, StorageError> {
        Ok(self
            .lock()
            .encryptions
            .iter()
            .filter(|r| r.user_id == owner_id && r.status == ProcessStatus::Completed)
            .count())
    }

    fn count_high_risk_analyses(&self, owner_id: &str) -> Result<usize, StorageError> {
        Ok(self
            .lock()
            .analyses
            .iter()
            .filter(|r| r.user_id == owner_id && r.risk_level == Some(RiskLevel::High))
            .count())
    }
}

impl IActivityLog for InMemoryStorage {
    fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StorageError> {
        Self::injected(&self.fail_activity_writes, "append_activity")?;
        self.lock().activity.push(entry.clone());
        Ok(())
    }

    fn recent_activity(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        Ok(self
            .lock()
            .activity
            .iter()
            .rev()
            .filter(|e| e.user_id == owner_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl IIdentityResolver for InMemoryStorage {
    fn resolve_bearer(&self, token: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().tokens.get(token).cloned())
    }

    fn issue_access_token(&self, user_id: &str, token: &str) -> Result<(), StorageError> {
        self.lock()
            .tokens
            .insert(token.to_string(), user_id.to_string());
        Ok(())
    }
}

/// In-memory blob store.
#[derive(Default)]
pub struct InMemoryObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_uploads: AtomicBool,
}

impl InMemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put_object` fail.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}

impl IObjectStorage for InMemoryObjectStorage {
    fn put_object(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::ObjectWriteFailed {
                path: path.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get_object(&self, path: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned())
    }
}
