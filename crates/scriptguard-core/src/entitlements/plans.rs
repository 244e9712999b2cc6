//! Per-plan numeric limits.

use serde::Serialize;

use crate::models::{PlanTier, ProtectionLevel};

/// Limits granted by one plan. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub plan: PlanTier,
    pub initial_credits: Option<u32>,
    pub max_active_keys: Option<usize>,
    /// Hours a record stays available. `None` means permanent.
    pub retention_hours: Option<i64>,
    pub allowed_levels: Vec<ProtectionLevel>,
    pub encrypt_cost: u32,
    pub analyze_cost: u32,
}

impl PlanLimits {
    pub fn for_plan(plan: PlanTier) -> Self {
        use super::policy::{credit_cost, OperationKind};

        Self {
            plan,
            initial_credits: initial_credits(plan),
            max_active_keys: max_active_keys(plan),
            retention_hours: retention_hours(plan),
            allowed_levels: allowed_levels(plan),
            encrypt_cost: credit_cost(plan, OperationKind::Encrypt),
            analyze_cost: credit_cost(plan, OperationKind::Analyze),
        }
    }
}

/// Credits granted when a profile is provisioned on this plan.
pub fn initial_credits(plan: PlanTier) -> Option<u32> {
    match plan {
        PlanTier::Trial => Some(10),
        PlanTier::Basic | PlanTier::Pro => Some(40),
        PlanTier::Infinite => None,
    }
}

/// Maximum keys that may be active at the same time.
pub fn max_active_keys(plan: PlanTier) -> Option<usize> {
    match plan {
        PlanTier::Trial => Some(1),
        PlanTier::Basic | PlanTier::Pro => Some(10),
        PlanTier::Infinite => None,
    }
}

/// Retention window in hours.
pub fn retention_hours(plan: PlanTier) -> Option<i64> {
    match plan {
        PlanTier::Trial => Some(24),
        PlanTier::Basic => Some(72),
        PlanTier::Pro | PlanTier::Infinite => None,
    }
}

/// Protection levels the plan may request.
pub fn allowed_levels(plan: PlanTier) -> Vec<ProtectionLevel> {
    if plan.is_unlimited() {
        vec![
            ProtectionLevel::Standard,
            ProtectionLevel::Advanced,
            ProtectionLevel::Undetectable,
        ]
    } else {
        vec![ProtectionLevel::Standard]
    }
}

/// Limits for every plan, cheapest first.
pub fn plan_catalog() -> Vec<PlanLimits> {
    PlanTier::ALL.iter().copied().map(PlanLimits::for_plan).collect()
}
