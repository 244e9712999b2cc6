//! `encrypt`: wrap a script, store the artifact, bill, log.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{non_blank, CallerIdentity, OperationRun, OperationStage, Orchestrator};
use crate::entitlements::{authorize, expiration_for, Charge, OperationKind};
use crate::errors::{OperationError, OperationResult};
use crate::models::{
    new_id, ActivityAction, ActivityEntry, ActivityStatus, EncryptionRecord, LicenseKey,
    ProcessStatus, Profile, ProtectionLevel, RecordKind,
};
use crate::protection::{sanitize_file_name, transform};

const FILE_TYPE: &str = "lua";
const ARTIFACT_CONTENT_TYPE: &str = "text/plain";

/// Raw encrypt input. Every field is optional so that missing fields
/// surface as `BadRequest` rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptRequest {
    pub file_content: Option<String>,
    pub file_name: Option<String>,
    pub license_key_id: Option<String>,
    pub protection_level: Option<String>,
    pub custom_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptOutcome {
    pub success: bool,
    pub encryption_log_id: String,
    pub loader_code: String,
    pub file_name: String,
}

/// Input after the `received` checks.
struct EncryptInput {
    content: String,
    file_name: String,
    license_key_id: String,
    level: ProtectionLevel,
    item_name: String,
}

impl EncryptRequest {
    fn validate(self) -> OperationResult<EncryptInput> {
        let content = self
            .file_content
            .ok_or_else(|| OperationError::bad_request("Missing required fields"))?;
        let file_name = non_blank(self.file_name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Missing required fields"))?
            .to_string();
        let license_key_id = non_blank(self.license_key_id.as_deref())
            .ok_or_else(|| OperationError::bad_request("Missing required fields"))?
            .to_string();
        let level = match non_blank(self.protection_level.as_deref()) {
            None => ProtectionLevel::default(),
            Some(raw) => ProtectionLevel::parse(raw).ok_or_else(|| {
                OperationError::bad_request(format!("Unknown protection level: {raw}"))
            })?,
        };
        let item_name = non_blank(self.custom_name.as_deref())
            .unwrap_or(&file_name)
            .to_string();
        Ok(EncryptInput {
            content,
            file_name,
            license_key_id,
            level,
            item_name,
        })
    }
}

impl Orchestrator {
    /// Encode a script under one of the caller's active license keys.
    ///
    /// Nothing is written before the token check passes. After that, every
    /// failure leaves a `failed` activity entry.
    pub fn encrypt(
        &self,
        caller: Option<&CallerIdentity>,
        request: EncryptRequest,
    ) -> OperationResult<EncryptOutcome> {
        let mut run = OperationRun::new(OperationKind::Encrypt);
        let input = request.validate()?;

        let caller = Self::require_caller(caller)?;
        run.advance(OperationStage::Authorized);

        let profile = self.load_profile(&caller.user_id)?;
        let charge = authorize(&profile, OperationKind::Encrypt, Some(input.level))?;
        let key = self.resolve_token(&input.license_key_id, &caller.user_id)?;
        run.advance(OperationStage::Validated);

        self.encrypt_validated(&mut run, &profile, &key, &input, charge)
            .map_err(|err| {
                self.finish_failed(
                    &run,
                    &caller.user_id,
                    ActivityAction::Encrypt,
                    &input.item_name,
                    err,
                )
            })
    }

    fn encrypt_validated(
        &self,
        run: &mut OperationRun,
        profile: &Profile,
        key: &LicenseKey,
        input: &EncryptInput,
        charge: Charge,
    ) -> OperationResult<EncryptOutcome> {
        let now = self.now();
        let output = transform(&input.content, input.level, &key.key_value);

        let storage_path = format!(
            "{}/{}_{}",
            profile.id,
            Uuid::new_v4(),
            sanitize_file_name(&input.file_name)
        );
        self.objects
            .put_object(&storage_path, output.artifact.as_bytes(), ARTIFACT_CONTENT_TYPE)
            .map_err(|e| OperationError::StorageUploadFailed {
                message: e.to_string(),
            })?;

        let record = EncryptionRecord {
            id: new_id(),
            user_id: profile.id.clone(),
            file_name: input.item_name.clone(),
            file_type: FILE_TYPE.to_string(),
            protection_level: input.level,
            license_key_id: Some(key.id.clone()),
            encrypted_file_path: Some(storage_path),
            loader_code: Some(output.loader_code.clone()),
            credits_used: charge.cost,
            status: ProcessStatus::Completed,
            expiration_date: expiration_for(profile.plan, now),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_encryption_record(&record)?;
        run.record = Some((RecordKind::Encryption, record.id.clone()));
        run.advance(OperationStage::Persisted);

        self.bill(run, &profile.id, charge)?;
        run.advance(OperationStage::Billed);

        self.storage.increment_scripts_count(&key.id)?;

        self.log_activity(ActivityEntry::new(
            &profile.id,
            ActivityAction::Encrypt,
            &input.item_name,
            ActivityStatus::Completed,
            charge.cost,
            Some(format!("Protection: {}", input.level)),
            now,
        ));
        run.advance(OperationStage::Logged);

        info!(
            user_id = %profile.id,
            record_id = %record.id,
            key_id = %key.id,
            level = %input.level,
            cost = charge.cost,
            "script encrypted"
        );
        run.advance(OperationStage::Completed);

        Ok(EncryptOutcome {
            success: true,
            encryption_log_id: record.id,
            loader_code: output.loader_code,
            file_name: input.file_name.clone(),
        })
    }
}
