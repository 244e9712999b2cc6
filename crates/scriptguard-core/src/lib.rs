//! # scriptguard-core
//!
//! Foundation crate for ScriptGuard.
//! Defines the domain models, the plan entitlement policy, the storage traits,
//! errors, config, tracing setup, the script transform stub and the operation
//! orchestrator. The storage and server crates depend on this.

pub mod config;
pub mod entitlements;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod protection;
pub mod tracing;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::ScriptGuardConfig;
pub use errors::{OperationError, OperationResult, PolicyError, ScriptGuardErrorCode, StorageError};
pub use models::{
    ActivityAction, ActivityEntry, ActivityStatus, AnalysisRecord, EncryptionRecord, KeyStatus,
    LicenseKey, PlanTier, ProcessStatus, Profile, ProtectionLevel, RiskLevel, Severity,
    Vulnerability,
};
pub use orchestrator::{CallerIdentity, Orchestrator};
pub use traits::{IObjectStorage, IScriptGuardStorage};
