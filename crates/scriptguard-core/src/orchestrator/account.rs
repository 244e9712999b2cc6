//! Account operations: provisioning, profile, history and dashboard.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{non_blank, CallerIdentity, Orchestrator};
use crate::entitlements::plans::initial_credits;
use crate::entitlements::{plan_catalog, PlanLimits};
use crate::errors::{OperationError, OperationResult};
use crate::models::license_key::generate_key_value;
use crate::models::{
    new_id, ActivityAction, ActivityEntry, ActivityStatus, AnalysisRecord, EncryptionRecord,
    PlanTier, Profile,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 200;
const MINIMUM_AGE: u32 = 18;
/// Completed encryptions that count as "fully protected" on the dashboard.
const PROTECTION_TARGET: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub age: Option<u32>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionOutcome {
    pub profile: Profile,
    /// Bearer credential for every later call.
    pub access_token: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub plan: PlanTier,
    pub credits_remaining: u32,
    pub unlimited_credits: bool,
    pub protected_scripts: usize,
    /// Percentage, capped at 100.
    pub protection_average: u32,
    pub active_licenses: usize,
    pub critical_alerts: usize,
}

impl Orchestrator {
    /// Create a profile with the plan's starting credits and issue its
    /// access token.
    pub fn provision_profile(&self, request: ProvisionRequest) -> OperationResult<ProvisionOutcome> {
        let name = non_blank(request.name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Name is required"))?
            .to_string();
        let company_name = non_blank(request.company_name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Company name is required"))?
            .to_string();
        let age = request
            .age
            .ok_or_else(|| OperationError::bad_request("Age is required"))?;
        if age < MINIMUM_AGE {
            return Err(OperationError::bad_request(format!(
                "You must be at least {MINIMUM_AGE} years old"
            )));
        }
        let plan = match non_blank(request.plan.as_deref()) {
            None => PlanTier::Trial,
            Some(raw) => PlanTier::parse(raw)
                .ok_or_else(|| OperationError::bad_request(format!("Unknown plan: {raw}")))?,
        };

        let now = self.now();
        let profile = Profile {
            id: new_id(),
            name,
            company_name,
            age,
            credits: initial_credits(plan).unwrap_or(0),
            plan,
            name_change_used: false,
            theme_preference: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_profile(&profile)?;

        let access_token = generate_key_value();
        self.storage.issue_access_token(&profile.id, &access_token)?;

        self.log_activity(ActivityEntry::new(
            &profile.id,
            ActivityAction::AccountCreated,
            &profile.name,
            ActivityStatus::Success,
            0,
            Some(format!("Plan: {plan}")),
            now,
        ));
        info!(user_id = %profile.id, plan = %plan, credits = profile.credits, "profile provisioned");

        Ok(ProvisionOutcome {
            profile,
            access_token,
        })
    }

    pub fn get_profile(&self, caller: Option<&CallerIdentity>) -> OperationResult<Profile> {
        let caller = Self::require_caller(caller)?;
        self.load_profile(&caller.user_id)
    }

    /// Change the display name. Allowed once per profile.
    pub fn rename_profile(
        &self,
        caller: Option<&CallerIdentity>,
        request: RenameRequest,
    ) -> OperationResult<Profile> {
        let new_name = non_blank(request.name.as_deref())
            .ok_or_else(|| OperationError::bad_request("Name is required"))?
            .to_string();
        let caller = Self::require_caller(caller)?;
        let previous = self.load_profile(&caller.user_id)?;

        if !self.storage.rename_once(&caller.user_id, &new_name)? {
            return Err(OperationError::NameChangeUsed);
        }
        self.log_activity(ActivityEntry::new(
            &caller.user_id,
            ActivityAction::ProfileRenamed,
            &new_name,
            ActivityStatus::Success,
            0,
            Some(format!("Previous name: {}", previous.name)),
            self.now(),
        ));
        info!(user_id = %caller.user_id, "profile renamed");
        self.load_profile(&caller.user_id)
    }

    /// Newest first. `limit` defaults to 50 and is clamped to `1..=200`.
    pub fn recent_activity(
        &self,
        caller: Option<&CallerIdentity>,
        limit: Option<usize>,
    ) -> OperationResult<Vec<ActivityEntry>> {
        let caller = Self::require_caller(caller)?;
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(self.storage.recent_activity(&caller.user_id, limit)?)
    }

    pub fn dashboard(&self, caller: Option<&CallerIdentity>) -> OperationResult<DashboardStats> {
        let caller = Self::require_caller(caller)?;
        let profile = self.load_profile(&caller.user_id)?;
        let protected_scripts = self.storage.count_completed_encryptions(&profile.id)?;
        Ok(DashboardStats {
            plan: profile.plan,
            credits_remaining: profile.credits,
            unlimited_credits: profile.plan.is_unlimited(),
            protected_scripts,
            protection_average: protection_average(protected_scripts),
            active_licenses: self.storage.count_active_keys(&profile.id)?,
            critical_alerts: self.storage.count_high_risk_analyses(&profile.id)?,
        })
    }

    pub fn list_encryptions(
        &self,
        caller: Option<&CallerIdentity>,
    ) -> OperationResult<Vec<EncryptionRecord>> {
        let caller = Self::require_caller(caller)?;
        Ok(self.storage.list_encryption_records(&caller.user_id)?)
    }

    pub fn list_analyses(
        &self,
        caller: Option<&CallerIdentity>,
    ) -> OperationResult<Vec<AnalysisRecord>> {
        let caller = Self::require_caller(caller)?;
        Ok(self.storage.list_analysis_records(&caller.user_id)?)
    }

    /// Per-plan limits. Public: no caller needed.
    pub fn plan_catalog(&self) -> Vec<PlanLimits> {
        plan_catalog()
    }
}

/// `min(completed / 10 * 100, 100)`, rounded down.
pub fn protection_average(completed: usize) -> u32 {
    let pct = completed.saturating_mul(100) / PROTECTION_TARGET;
    pct.min(100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protection_average_caps_at_one_hundred() {
        assert_eq!(protection_average(0), 0);
        assert_eq!(protection_average(3), 30);
        assert_eq!(protection_average(10), 100);
        assert_eq!(protection_average(25), 100);
    }
}
