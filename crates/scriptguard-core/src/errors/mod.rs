//! Error types for every ScriptGuard layer.
//!
//! Storage errors come from the row and object stores, policy errors from the
//! entitlement rules, and operation errors are what request handlers see.

pub mod error_code;
mod operation_error;
mod policy_error;
mod storage_error;

pub use error_code::ScriptGuardErrorCode;
pub use operation_error::{OperationError, OperationResult};
pub use policy_error::PolicyError;
pub use storage_error::StorageError;
