//! License key management.
//!
//! Keys are owner-scoped: a key id that belongs to someone else behaves
//! exactly like one that does not exist.

use serde::Deserialize;
use tracing::info;

use super::{non_blank, CallerIdentity, Orchestrator};
use crate::entitlements::plans::max_active_keys;
use crate::errors::{OperationError, OperationResult};
use crate::models::{
    ActivityAction, ActivityEntry, ActivityStatus, KeyStatus, LicenseKey, Profile,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub key_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKeyStatusRequest {
    pub status: Option<String>,
}

impl Orchestrator {
    /// The key, if it exists for the owner and is active.
    pub fn resolve_token(&self, key_id: &str, owner_id: &str) -> OperationResult<LicenseKey> {
        let key = self
            .storage
            .get_key(key_id, owner_id)?
            .ok_or(OperationError::TokenNotFound)?;
        if !key.is_active() {
            return Err(OperationError::TokenInactive);
        }
        Ok(key)
    }

    pub fn list_keys(&self, caller: Option<&CallerIdentity>) -> OperationResult<Vec<LicenseKey>> {
        let caller = Self::require_caller(caller)?;
        Ok(self.storage.list_keys(&caller.user_id)?)
    }

    pub fn create_key(
        &self,
        caller: Option<&CallerIdentity>,
        request: CreateKeyRequest,
    ) -> OperationResult<LicenseKey> {
        let key_name = non_blank(request.key_name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Key name is required"))?
            .to_string();
        let caller = Self::require_caller(caller)?;
        let profile = self.load_profile(&caller.user_id)?;
        self.ensure_key_capacity(&profile)?;

        let key = LicenseKey::generate(&profile.id, &key_name, self.now());
        self.storage.insert_key(&key)?;
        self.log_activity(ActivityEntry::new(
            &profile.id,
            ActivityAction::KeyCreated,
            &key.key_name,
            ActivityStatus::Success,
            0,
            None,
            key.created_at,
        ));
        info!(user_id = %profile.id, key_id = %key.id, "license key created");
        Ok(key)
    }

    /// Toggle a key between active and inactive. Revoked keys stay revoked.
    pub fn set_key_status(
        &self,
        caller: Option<&CallerIdentity>,
        key_id: &str,
        request: UpdateKeyStatusRequest,
    ) -> OperationResult<LicenseKey> {
        let status = match non_blank(request.status.as_deref()).and_then(KeyStatus::parse) {
            Some(s @ (KeyStatus::Active | KeyStatus::Inactive)) => s,
            _ => {
                return Err(OperationError::bad_request(
                    "Status must be 'active' or 'inactive'",
                ))
            }
        };
        let caller = Self::require_caller(caller)?;
        let mut key = self
            .storage
            .get_key(key_id, &caller.user_id)?
            .ok_or(OperationError::TokenNotFound)?;

        if key.status == KeyStatus::Revoked {
            return Err(OperationError::bad_request(
                "License key has been revoked",
            ));
        }
        if key.status == status {
            return Ok(key);
        }
        if status == KeyStatus::Active {
            let profile = self.load_profile(&caller.user_id)?;
            self.ensure_key_capacity(&profile)?;
        }

        self.update_key_status(&caller.user_id, &key, status)?;
        key.status = status;
        key.updated_at = self.now();
        Ok(key)
    }

    pub fn revoke_key(
        &self,
        caller: Option<&CallerIdentity>,
        key_id: &str,
    ) -> OperationResult<LicenseKey> {
        let caller = Self::require_caller(caller)?;
        let mut key = self
            .storage
            .get_key(key_id, &caller.user_id)?
            .ok_or(OperationError::TokenNotFound)?;
        if key.status != KeyStatus::Revoked {
            self.update_key_status(&caller.user_id, &key, KeyStatus::Revoked)?;
            key.status = KeyStatus::Revoked;
            key.updated_at = self.now();
        }
        Ok(key)
    }

    pub fn delete_key(&self, caller: Option<&CallerIdentity>, key_id: &str) -> OperationResult<()> {
        let caller = Self::require_caller(caller)?;
        let key = self
            .storage
            .get_key(key_id, &caller.user_id)?
            .ok_or(OperationError::TokenNotFound)?;
        if !self.storage.delete_key(key_id, &caller.user_id)? {
            return Err(OperationError::TokenNotFound);
        }
        self.log_activity(ActivityEntry::new(
            &caller.user_id,
            ActivityAction::KeyDeleted,
            &key.key_name,
            ActivityStatus::Success,
            0,
            None,
            self.now(),
        ));
        info!(user_id = %caller.user_id, key_id, "license key deleted");
        Ok(())
    }

    /// `KeyLimitReached` once the plan's active-key allowance is used up.
    fn ensure_key_capacity(&self, profile: &Profile) -> OperationResult<()> {
        let Some(limit) = max_active_keys(profile.plan) else {
            return Ok(());
        };
        if self.storage.count_active_keys(&profile.id)? >= limit {
            return Err(OperationError::KeyLimitReached {
                plan: profile.plan,
                limit,
            });
        }
        Ok(())
    }

    fn update_key_status(
        &self,
        owner_id: &str,
        key: &LicenseKey,
        status: KeyStatus,
    ) -> OperationResult<()> {
        if !self.storage.set_key_status(&key.id, owner_id, status)? {
            return Err(OperationError::TokenNotFound);
        }
        self.log_activity(ActivityEntry::new(
            owner_id,
            ActivityAction::KeyStatusChanged,
            &key.key_name,
            ActivityStatus::Success,
            0,
            Some(format!("Status: {} -> {}", key.status, status)),
            self.now(),
        ));
        info!(user_id = owner_id, key_id = %key.id, from = %key.status, to = %status, "license key status changed");
        Ok(())
    }
}
