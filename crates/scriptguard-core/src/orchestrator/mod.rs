//! Operation orchestrator: the request handlers' business logic.
//!
//! Every call takes the caller identity as an explicit argument. The
//! orchestrator holds no per-request state; all state lives behind the
//! storage traits.
//!
//! ## Operations
//! - **encrypt**: policy, token check, transform, upload, record, bill, log
//! - **analyze**: policy, findings, record, bill, log
//! - **keys**: license key management
//! - **account**: provisioning, profile, history, dashboard

pub mod account;
pub mod analyze;
pub mod encrypt;
pub mod keys;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::entitlements::{Charge, OperationKind};
use crate::errors::{OperationError, OperationResult, ScriptGuardErrorCode};
use crate::models::{
    ActivityAction, ActivityEntry, ActivityStatus, ProcessStatus, Profile, RecordKind,
};
use crate::protection::{FindingsGenerator, PlaceholderFindings};
use crate::traits::{IObjectStorage, IScriptGuardStorage};

pub use account::{
    DashboardStats, ProvisionOutcome, ProvisionRequest, RenameRequest, DEFAULT_HISTORY_LIMIT,
    MAX_HISTORY_LIMIT,
};
pub use analyze::{AnalyzeOutcome, AnalyzeRequest};
pub use encrypt::{EncryptOutcome, EncryptRequest};
pub use keys::{CreateKeyRequest, UpdateKeyStatusRequest};

/// The authenticated caller, resolved from the request credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Source of "now". Swappable so expiration is testable.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Progress of one credit-consuming operation. `failed` is not a stage:
/// it is the error return from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OperationStage {
    Received,
    Authorized,
    Validated,
    Persisted,
    Billed,
    Logged,
    Completed,
}

impl OperationStage {
    /// Failures from here on leave a `failed` activity entry.
    pub fn audits_failures(&self) -> bool {
        *self >= Self::Validated
    }
}

/// Bookkeeping for one in-flight operation.
#[derive(Debug)]
struct OperationRun {
    operation: OperationKind,
    stage: OperationStage,
    /// Credits actually debited so far.
    charged: u32,
    record: Option<(RecordKind, String)>,
}

impl OperationRun {
    fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            stage: OperationStage::Received,
            charged: 0,
            record: None,
        }
    }

    fn advance(&mut self, stage: OperationStage) {
        debug!(operation = self.operation.as_str(), from = ?self.stage, to = ?stage, "operation stage");
        self.stage = stage;
    }
}

pub struct Orchestrator {
    storage: Arc<dyn IScriptGuardStorage>,
    objects: Arc<dyn IObjectStorage>,
    findings: Arc<dyn FindingsGenerator>,
    clock: Clock,
}

impl Orchestrator {
    /// Orchestrator with placeholder findings and the system clock.
    pub fn new(storage: Arc<dyn IScriptGuardStorage>, objects: Arc<dyn IObjectStorage>) -> Self {
        Self {
            storage,
            objects,
            findings: Arc::new(PlaceholderFindings),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_findings_generator(mut self, findings: Arc<dyn FindingsGenerator>) -> Self {
        self.findings = findings;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage(&self) -> &Arc<dyn IScriptGuardStorage> {
        &self.storage
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    fn require_caller(caller: Option<&CallerIdentity>) -> OperationResult<&CallerIdentity> {
        caller.ok_or(OperationError::Unauthenticated)
    }

    fn load_profile(&self, user_id: &str) -> OperationResult<Profile> {
        self.storage
            .get_profile(user_id)?
            .ok_or(OperationError::ProfileNotFound)
    }

    /// Debit the charge. Unlimited plans and free operations skip the store.
    fn bill(&self, run: &mut OperationRun, user_id: &str, charge: Charge) -> OperationResult<()> {
        if !charge.debits_balance || charge.cost == 0 {
            return Ok(());
        }
        match self.storage.try_debit_credits(user_id, charge.cost)? {
            Some(remaining) => {
                run.charged = charge.cost;
                debug!(user_id, cost = charge.cost, remaining, "credits debited");
                Ok(())
            }
            None => {
                // Balance changed since the policy check.
                let available = self
                    .storage
                    .get_profile(user_id)
                    .ok()
                    .flatten()
                    .map(|p| p.credits)
                    .unwrap_or(0);
                Err(OperationError::InsufficientCredits {
                    required: charge.cost,
                    available,
                })
            }
        }
    }

    /// Append an activity entry. Failure is logged, never propagated.
    fn log_activity(&self, entry: ActivityEntry) {
        if let Err(e) = self.storage.append_activity(&entry) {
            warn!(
                user_id = %entry.user_id,
                action = entry.action.as_str(),
                status = entry.status.as_str(),
                error = %e,
                "failed to append activity entry"
            );
        }
    }

    /// Record a failure that happened after validation: mark the record
    /// failed and append a `failed` activity entry. Both are best effort.
    fn finish_failed(
        &self,
        run: &OperationRun,
        user_id: &str,
        action: ActivityAction,
        item_name: &str,
        err: OperationError,
    ) -> OperationError {
        warn!(
            operation = run.operation.as_str(),
            stage = ?run.stage,
            user_id,
            error_code = err.error_code(),
            error = %err,
            "operation failed"
        );
        if !run.stage.audits_failures() {
            return err;
        }
        if let Some((kind, record_id)) = &run.record {
            if let Err(e) = self
                .storage
                .set_record_status(*kind, record_id, ProcessStatus::Failed)
            {
                warn!(record_id = %record_id, error = %e, "failed to mark record failed");
            }
        }
        let detail = match &err {
            OperationError::StorageUploadFailed { message } => {
                format!("{err}: {message}")
            }
            other => other.to_string(),
        };
        self.log_activity(ActivityEntry::new(
            user_id,
            action,
            item_name,
            ActivityStatus::Failed,
            run.charged,
            Some(detail),
            self.now(),
        ));
        err
    }
}

/// Trimmed, non-empty string or `None`.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
