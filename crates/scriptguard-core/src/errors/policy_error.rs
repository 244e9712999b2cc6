//! Entitlement policy violations.

use super::error_code::{self, ScriptGuardErrorCode};
use crate::models::{PlanTier, ProtectionLevel};

/// A request the caller's plan does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("Protection level '{level}' is not available on the {plan} plan")]
    LevelNotPermitted { level: ProtectionLevel, plan: PlanTier },

    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: u32, available: u32 },
}

impl ScriptGuardErrorCode for PolicyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::LevelNotPermitted { .. } => error_code::LEVEL_NOT_PERMITTED,
            Self::InsufficientCredits { .. } => error_code::INSUFFICIENT_CREDITS,
        }
    }
}
