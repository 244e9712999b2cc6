//! StorageEngine integration tests: schema, per-table queries, and the
//! orchestrator running end to end on SQLite plus the filesystem store.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;

use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{
    ActivityAction, ActivityEntry, ActivityStatus, AnalysisRecord, EncryptionRecord, KeyStatus,
    LicenseKey, PlanTier, ProcessStatus, Profile, ProtectionLevel, RecordKind, RiskLevel,
    Severity, Vulnerability,
};
use scriptguard_core::orchestrator::{EncryptRequest, ProvisionRequest};
use scriptguard_core::traits::{
    IActivityLog, IIdentityResolver, ILicenseKeyStore, IObjectStorage, IOperationLogStore,
    IProfileStore,
};
use scriptguard_core::{CallerIdentity, Orchestrator};
use scriptguard_storage::migrations::CURRENT_VERSION;
use scriptguard_storage::{FsObjectStorage, StorageEngine};

// =============================================================================
// Fixtures
// =============================================================================

fn t(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
}

fn profile(id: &str, plan: PlanTier, credits: u32) -> Profile {
    Profile {
        id: id.to_string(),
        name: "Ada".to_string(),
        company_name: "Engines".to_string(),
        age: 36,
        credits,
        plan,
        name_change_used: false,
        theme_preference: Some("dark".to_string()),
        created_at: t(0),
        updated_at: t(0),
    }
}

fn engine_with_user(id: &str, plan: PlanTier, credits: u32) -> StorageEngine {
    let engine = StorageEngine::open_in_memory().expect("in-memory storage");
    engine.insert_profile(&profile(id, plan, credits)).unwrap();
    engine
}

fn key(owner: &str, name: &str, created: DateTime<Utc>) -> LicenseKey {
    LicenseKey::generate(owner, name, created)
}

fn encryption(owner: &str, created: DateTime<Utc>, status: ProcessStatus) -> EncryptionRecord {
    EncryptionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: owner.to_string(),
        file_name: "main.lua".to_string(),
        file_type: "lua".to_string(),
        protection_level: ProtectionLevel::Standard,
        license_key_id: None,
        encrypted_file_path: Some(format!("{owner}/x_main.lua")),
        loader_code: Some("-- loader".to_string()),
        credits_used: 4,
        status,
        expiration_date: created + Duration::hours(24),
        created_at: created,
        updated_at: created,
    }
}

fn analysis(owner: &str, risk: RiskLevel) -> AnalysisRecord {
    AnalysisRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: owner.to_string(),
        file_name: "main.lua".to_string(),
        risk_level: Some(risk),
        vulnerabilities: vec![Vulnerability {
            kind: "SQL Injection".to_string(),
            severity: Severity::High,
            line: 12,
            description: "Potential SQL injection vulnerability detected".to_string(),
        }],
        suggestions: vec!["Use parameterized queries".to_string()],
        credits_used: 2,
        status: ProcessStatus::Completed,
        expiration_date: t(0) + Duration::hours(72),
        created_at: t(0),
        updated_at: t(0),
    }
}

// =============================================================================
// Schema
// =============================================================================

#[test]
fn fresh_database_is_at_current_version() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert_eq!(engine.schema_version().unwrap(), CURRENT_VERSION);
    assert!(engine.path().is_none());
}

#[test]
fn reopening_a_file_keeps_data_and_version() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("scriptguard.db");
    {
        let engine = StorageEngine::open(&db_path).unwrap();
        engine.insert_profile(&profile("u1", PlanTier::Basic, 40)).unwrap();
    }
    let engine = StorageEngine::open(&db_path).unwrap();
    assert_eq!(engine.schema_version().unwrap(), CURRENT_VERSION);
    assert_eq!(engine.get_profile("u1").unwrap().unwrap().credits, 40);
    assert_eq!(engine.path(), Some(db_path.as_path()));
}

// =============================================================================
// Profiles
// =============================================================================

#[test]
fn profile_round_trips() {
    let engine = engine_with_user("u1", PlanTier::Pro, 40);
    let loaded = engine.get_profile("u1").unwrap().unwrap();
    assert_eq!(loaded, profile("u1", PlanTier::Pro, 40));
    assert!(engine.get_profile("nobody").unwrap().is_none());
}

#[test]
fn debit_is_conditional_on_balance() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);

    assert_eq!(engine.try_debit_credits("u1", 4).unwrap(), Some(6));
    assert_eq!(engine.try_debit_credits("u1", 4).unwrap(), Some(2));
    assert_eq!(engine.try_debit_credits("u1", 4).unwrap(), None);
    assert_eq!(engine.get_profile("u1").unwrap().unwrap().credits, 2);
    assert_eq!(engine.try_debit_credits("ghost", 1).unwrap(), None);
}

#[test]
fn rename_succeeds_once() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    assert!(engine.rename_once("u1", "Ada L.").unwrap());
    assert!(!engine.rename_once("u1", "Again").unwrap());
    let loaded = engine.get_profile("u1").unwrap().unwrap();
    assert_eq!(loaded.name, "Ada L.");
    assert!(loaded.name_change_used);
}

#[test]
fn corrupt_plan_is_reported_not_defaulted() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    engine
        .with_conn(|conn| {
            conn.execute_batch(
                "PRAGMA ignore_check_constraints = ON;
                 UPDATE profiles SET plan = 'gold' WHERE id = 'u1';",
            )
            .map_err(scriptguard_storage::to_storage_err)
        })
        .unwrap();

    let err = engine.get_profile("u1").unwrap_err();
    assert!(matches!(err, StorageError::CorruptRow { ref table, .. } if table == "profiles"));
}

// =============================================================================
// License keys
// =============================================================================

#[test]
fn keys_are_owner_scoped_and_newest_first() {
    let engine = engine_with_user("u1", PlanTier::Basic, 40);
    engine.insert_profile(&profile("u2", PlanTier::Basic, 40)).unwrap();

    let older = key("u1", "older", t(1));
    let newer = key("u1", "newer", t(2));
    engine.insert_key(&older).unwrap();
    engine.insert_key(&newer).unwrap();

    let listed = engine.list_keys("u1").unwrap();
    assert_eq!(
        listed.iter().map(|k| k.key_name.as_str()).collect::<Vec<_>>(),
        vec!["newer", "older"]
    );
    assert_eq!(listed[1], older);

    assert!(engine.get_key(&older.id, "u2").unwrap().is_none());
    assert!(!engine.set_key_status(&older.id, "u2", KeyStatus::Revoked).unwrap());
    assert!(!engine.delete_key(&older.id, "u2").unwrap());
    assert!(engine.list_keys("u2").unwrap().is_empty());
}

#[test]
fn status_changes_drive_active_count() {
    let engine = engine_with_user("u1", PlanTier::Basic, 40);
    let a = key("u1", "a", t(1));
    let b = key("u1", "b", t(2));
    engine.insert_key(&a).unwrap();
    engine.insert_key(&b).unwrap();
    assert_eq!(engine.count_active_keys("u1").unwrap(), 2);

    assert!(engine.set_key_status(&a.id, "u1", KeyStatus::Inactive).unwrap());
    assert_eq!(engine.count_active_keys("u1").unwrap(), 1);

    assert!(engine.delete_key(&b.id, "u1").unwrap());
    assert_eq!(engine.count_active_keys("u1").unwrap(), 0);
    assert_eq!(
        engine.get_key(&a.id, "u1").unwrap().unwrap().status,
        KeyStatus::Inactive
    );
}

#[test]
fn scripts_count_increments_in_place() {
    let engine = engine_with_user("u1", PlanTier::Basic, 40);
    let k = key("u1", "main", t(1));
    engine.insert_key(&k).unwrap();
    for _ in 0..3 {
        engine.increment_scripts_count(&k.id).unwrap();
    }
    assert_eq!(engine.get_key(&k.id, "u1").unwrap().unwrap().scripts_count, 3);
}

#[test]
fn deleting_a_key_keeps_its_encryption_records() {
    let engine = engine_with_user("u1", PlanTier::Basic, 40);
    let k = key("u1", "main", t(1));
    engine.insert_key(&k).unwrap();
    let mut record = encryption("u1", t(2), ProcessStatus::Completed);
    record.license_key_id = Some(k.id.clone());
    engine.insert_encryption_record(&record).unwrap();

    assert!(engine.delete_key(&k.id, "u1").unwrap());

    let records = engine.list_encryption_records("u1").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].license_key_id, None);
}

// =============================================================================
// Operation records
// =============================================================================

#[test]
fn encryption_records_round_trip_and_count_completed_only() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    let first = encryption("u1", t(1), ProcessStatus::Completed);
    let second = encryption("u1", t(2), ProcessStatus::Completed);
    engine.insert_encryption_record(&first).unwrap();
    engine.insert_encryption_record(&second).unwrap();

    let listed = engine.list_encryption_records("u1").unwrap();
    assert_eq!(listed, vec![second.clone(), first.clone()]);
    assert_eq!(engine.count_completed_encryptions("u1").unwrap(), 2);

    engine
        .set_record_status(RecordKind::Encryption, &first.id, ProcessStatus::Failed)
        .unwrap();
    assert_eq!(engine.count_completed_encryptions("u1").unwrap(), 1);
}

#[test]
fn analysis_findings_survive_json_columns() {
    let engine = engine_with_user("u1", PlanTier::Basic, 40);
    let high = analysis("u1", RiskLevel::High);
    let low = analysis("u1", RiskLevel::Low);
    engine.insert_analysis_record(&high).unwrap();
    engine.insert_analysis_record(&low).unwrap();

    let listed = engine.list_analysis_records("u1").unwrap();
    assert_eq!(listed.len(), 2);
    let loaded = listed.iter().find(|r| r.id == high.id).unwrap();
    assert_eq!(loaded, &high);
    assert_eq!(engine.count_high_risk_analyses("u1").unwrap(), 1);

    engine
        .set_record_status(RecordKind::Analysis, &low.id, ProcessStatus::Failed)
        .unwrap();
    let reloaded = engine.list_analysis_records("u1").unwrap();
    assert_eq!(
        reloaded.iter().find(|r| r.id == low.id).unwrap().status,
        ProcessStatus::Failed
    );
}

// =============================================================================
// Activity and identity
// =============================================================================

#[test]
fn recent_activity_is_newest_first_with_limit() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    for minute in 0..5 {
        engine
            .append_activity(&ActivityEntry::new(
                "u1",
                ActivityAction::Analyze,
                &format!("file-{minute}"),
                ActivityStatus::Completed,
                2,
                Some("Risk Level: medium".to_string()),
                t(minute),
            ))
            .unwrap();
    }

    let recent = engine.recent_activity("u1", 3).unwrap();
    assert_eq!(
        recent.iter().map(|e| e.item_name.as_str()).collect::<Vec<_>>(),
        vec!["file-4", "file-3", "file-2"]
    );
    assert_eq!(recent[0].details.as_deref(), Some("Risk Level: medium"));
    assert!(engine.recent_activity("u2", 10).unwrap().is_empty());
}

#[test]
fn same_instant_entries_keep_insertion_order() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    for name in ["first", "second"] {
        engine
            .append_activity(&ActivityEntry::new(
                "u1",
                ActivityAction::KeyCreated,
                name,
                ActivityStatus::Success,
                0,
                None,
                t(0),
            ))
            .unwrap();
    }
    let recent = engine.recent_activity("u1", 10).unwrap();
    assert_eq!(recent[0].item_name, "second");
}

#[test]
fn access_tokens_resolve_to_their_user() {
    let engine = engine_with_user("u1", PlanTier::Trial, 10);
    engine.issue_access_token("u1", "tok-123").unwrap();
    assert_eq!(engine.resolve_bearer("tok-123").unwrap(), Some("u1".to_string()));
    assert_eq!(engine.resolve_bearer("tok-999").unwrap(), None);
}

// =============================================================================
// Object store
// =============================================================================

#[test]
fn objects_are_written_under_the_root() {
    let dir = TempDir::new().unwrap();
    let store = FsObjectStorage::open(dir.path().join("encrypted-files")).unwrap();

    store
        .put_object("u1/abc_main.lua", b"cHJpbnQoJ2hpJyk=", "text/plain")
        .unwrap();

    let on_disk = std::fs::read(store.root().join("u1").join("abc_main.lua")).unwrap();
    assert_eq!(on_disk, b"cHJpbnQoJ2hpJyk=");
    assert_eq!(
        store.get_object("u1/abc_main.lua").unwrap().as_deref(),
        Some(&b"cHJpbnQoJ2hpJyk="[..])
    );
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn provision_create_key_and_encrypt_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(StorageEngine::open(&dir.path().join("sg.db")).unwrap());
    let objects = Arc::new(FsObjectStorage::open(dir.path().join("objects")).unwrap());
    let orchestrator = Orchestrator::new(engine.clone(), objects.clone());

    let provisioned = orchestrator
        .provision_profile(ProvisionRequest {
            name: Some("Grace".to_string()),
            company_name: Some("Navy".to_string()),
            age: Some(40),
            plan: None,
        })
        .unwrap();
    let user_id = engine
        .resolve_bearer(&provisioned.access_token)
        .unwrap()
        .unwrap();
    let caller = CallerIdentity::new(user_id);

    let key = orchestrator
        .create_key(
            Some(&caller),
            scriptguard_core::orchestrator::CreateKeyRequest {
                key_name: Some("main".to_string()),
            },
        )
        .unwrap();

    let outcome = orchestrator
        .encrypt(
            Some(&caller),
            EncryptRequest {
                file_content: Some("print('hi')".to_string()),
                file_name: Some("main.lua".to_string()),
                license_key_id: Some(key.id.clone()),
                protection_level: None,
                custom_name: None,
            },
        )
        .unwrap();

    assert_eq!(engine.get_profile(&caller.user_id).unwrap().unwrap().credits, 6);
    assert_eq!(
        engine.get_key(&key.id, &caller.user_id).unwrap().unwrap().scripts_count,
        1
    );
    let record = &engine.list_encryption_records(&caller.user_id).unwrap()[0];
    assert_eq!(record.id, outcome.encryption_log_id);
    let artifact = objects
        .get_object(record.encrypted_file_path.as_deref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(artifact, b"cHJpbnQoJ2hpJyk=");

    let history = engine.recent_activity(&caller.user_id, 10).unwrap();
    let actions: Vec<ActivityAction> = history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ActivityAction::Encrypt,
            ActivityAction::KeyCreated,
            ActivityAction::AccountCreated
        ]
    );
}

#[test]
fn long_file_names_still_upload_to_disk() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(StorageEngine::open(&dir.path().join("sg.db")).unwrap());
    let objects = Arc::new(FsObjectStorage::open(dir.path().join("objects")).unwrap());
    let orchestrator = Orchestrator::new(engine.clone(), objects.clone());

    let provisioned = orchestrator
        .provision_profile(ProvisionRequest {
            name: Some("Grace".to_string()),
            company_name: Some("Navy".to_string()),
            age: Some(40),
            plan: None,
        })
        .unwrap();
    let caller = CallerIdentity::new(provisioned.profile.id.clone());
    let key = orchestrator
        .create_key(
            Some(&caller),
            scriptguard_core::orchestrator::CreateKeyRequest {
                key_name: Some("main".to_string()),
            },
        )
        .unwrap();

    let long_name = format!("{}.lua", "a".repeat(230));
    let outcome = orchestrator
        .encrypt(
            Some(&caller),
            EncryptRequest {
                file_content: Some("print('hi')".to_string()),
                file_name: Some(long_name.clone()),
                license_key_id: Some(key.id.clone()),
                protection_level: None,
                custom_name: None,
            },
        )
        .unwrap();

    assert_eq!(outcome.file_name, long_name);
    let record = &engine.list_encryption_records(&caller.user_id).unwrap()[0];
    let path = record.encrypted_file_path.as_deref().unwrap();
    assert!(path.ends_with(".lua"));
    assert!(objects.get_object(path).unwrap().is_some());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn debits_never_drive_credits_below_zero(
        start in 0u32..50,
        amounts in prop::collection::vec(0u32..10, 0..20),
    ) {
        let engine = engine_with_user("u1", PlanTier::Trial, start);
        let mut expected = start;
        for amount in amounts {
            let result = engine.try_debit_credits("u1", amount).unwrap();
            if amount <= expected {
                expected -= amount;
                prop_assert_eq!(result, Some(expected));
            } else {
                prop_assert_eq!(result, None);
            }
        }
        prop_assert_eq!(engine.get_profile("u1").unwrap().unwrap().credits, expected);
    }
}
