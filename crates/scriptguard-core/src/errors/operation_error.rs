//! The error taxonomy surfaced by the orchestrator.
//!
//! `Display` is the user-visible message: handlers put it verbatim in the
//! `{"error": ...}` body, so the wording here is part of the wire contract.

use super::error_code::{self, ScriptGuardErrorCode};
use super::{PolicyError, StorageError};
use crate::models::{PlanTier, ProtectionLevel};

/// Terminal failure of a single request. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Insufficient credits")]
    InsufficientCredits { required: u32, available: u32 },

    #[error("Protection level '{level}' is not available on the {plan} plan")]
    LevelNotPermitted { level: ProtectionLevel, plan: PlanTier },

    #[error("Invalid or inactive license key")]
    TokenNotFound,

    #[error("Invalid or inactive license key")]
    TokenInactive,

    #[error("Failed to upload encrypted file")]
    StorageUploadFailed { message: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("License key limit reached: the {plan} plan allows {limit} active key(s)")]
    KeyLimitReached { plan: PlanTier, limit: usize },

    #[error("Name can only be changed once")]
    NameChangeUsed,

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Unknown(String),
}

impl OperationError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<PolicyError> for OperationError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::LevelNotPermitted { level, plan } => {
                Self::LevelNotPermitted { level, plan }
            }
            PolicyError::InsufficientCredits { required, available } => {
                Self::InsufficientCredits { required, available }
            }
        }
    }
}

impl ScriptGuardErrorCode for OperationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => error_code::UNAUTHENTICATED,
            Self::ProfileNotFound => error_code::PROFILE_NOT_FOUND,
            Self::InsufficientCredits { .. } => error_code::INSUFFICIENT_CREDITS,
            Self::LevelNotPermitted { .. } => error_code::LEVEL_NOT_PERMITTED,
            Self::TokenNotFound => error_code::TOKEN_NOT_FOUND,
            Self::TokenInactive => error_code::TOKEN_INACTIVE,
            Self::StorageUploadFailed { .. } => error_code::STORAGE_UPLOAD_FAILED,
            Self::BadRequest(_) => error_code::BAD_REQUEST,
            Self::KeyLimitReached { .. } => error_code::KEY_LIMIT_REACHED,
            Self::NameChangeUsed => error_code::NAME_CHANGE_USED,
            Self::Storage(e) => e.error_code(),
            Self::Unknown(_) => error_code::UNKNOWN,
        }
    }
}

/// Convenience type alias.
pub type OperationResult<T> = Result<T, OperationError>;
