//! Shared traits used across ScriptGuard crates.

pub mod storage;

pub use storage::{
    IActivityLog, IIdentityResolver, ILicenseKeyStore, IObjectStorage, IOperationLogStore,
    IProfileStore, IScriptGuardStorage, InMemoryObjectStorage, InMemoryStorage,
};
