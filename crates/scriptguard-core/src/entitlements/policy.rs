//! Operation costs, authorization checks and record expiration.
//!
//! Everything here is pure: same inputs, same answer. The orchestrator calls
//! `authorize` before touching any store.

use chrono::{DateTime, Duration, Utc};

use super::plans::retention_hours;
use crate::errors::PolicyError;
use crate::models::{PlanTier, Profile, ProtectionLevel};

/// 2099-12-31T00:00:00Z, the expiration stamped on permanent records.
const PERMANENT_EXPIRATION_SECS: i64 = 4_102_358_400;

/// Credit-consuming operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Encrypt,
    Analyze,
}

impl OperationKind {
    /// List price, before plan exemptions.
    pub fn base_cost(&self) -> u32 {
        match self {
            Self::Encrypt => 4,
            Self::Analyze => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Analyze => "analyze",
        }
    }
}

/// What an authorized operation will cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    pub operation: OperationKind,
    pub cost: u32,
    /// False for unlimited plans: the balance is never touched.
    pub debits_balance: bool,
}

/// Credits charged to `plan` for `operation`.
pub fn credit_cost(plan: PlanTier, operation: OperationKind) -> u32 {
    if plan.is_unlimited() {
        0
    } else {
        operation.base_cost()
    }
}

/// Only the unlimited plan may request a non-baseline level.
pub fn check_level(plan: PlanTier, level: ProtectionLevel) -> Result<(), PolicyError> {
    if level.is_baseline() || plan.is_unlimited() {
        Ok(())
    } else {
        Err(PolicyError::LevelNotPermitted { level, plan })
    }
}

/// Unlimited plans always pass; everyone else needs `credits >= cost`.
pub fn check_credits(profile: &Profile, cost: u32) -> Result<(), PolicyError> {
    if profile.plan.is_unlimited() || profile.credits >= cost {
        Ok(())
    } else {
        Err(PolicyError::InsufficientCredits {
            required: cost,
            available: profile.credits,
        })
    }
}

/// Level first, then balance.
pub fn authorize(
    profile: &Profile,
    operation: OperationKind,
    level: Option<ProtectionLevel>,
) -> Result<Charge, PolicyError> {
    if let Some(level) = level {
        check_level(profile.plan, level)?;
    }
    let cost = credit_cost(profile.plan, operation);
    check_credits(profile, cost)?;
    Ok(Charge {
        operation,
        cost,
        debits_balance: !profile.plan.is_unlimited(),
    })
}

/// Far-future expiration used by plans without a retention window.
pub fn permanent_expiration() -> DateTime<Utc> {
    DateTime::from_timestamp(PERMANENT_EXPIRATION_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Expiration of a record created at `created_at` under `plan`.
pub fn expiration_for(plan: PlanTier, created_at: DateTime<Utc>) -> DateTime<Utc> {
    match retention_hours(plan) {
        Some(hours) => created_at + Duration::hours(hours),
        None => permanent_expiration(),
    }
}
