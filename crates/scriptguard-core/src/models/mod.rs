//! Typed records for every persisted entity.
//!
//! Stores validate rows into these types at the boundary; nothing above the
//! storage layer sees loosely-typed row data.

pub mod activity;
pub mod license_key;
pub mod operation_record;
pub mod profile;

pub use activity::{ActivityAction, ActivityEntry, ActivityStatus};
pub use license_key::{KeyStatus, LicenseKey};
pub use operation_record::{
    AnalysisRecord, EncryptionRecord, ProcessStatus, ProtectionLevel, RecordKind, RiskLevel,
    Severity, Vulnerability,
};
pub use profile::{PlanTier, Profile};

/// Fresh random record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
