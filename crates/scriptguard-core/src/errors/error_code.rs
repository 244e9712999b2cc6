//! Stable error codes used as tracing fields.

pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
pub const PROFILE_NOT_FOUND: &str = "PROFILE_NOT_FOUND";
pub const INSUFFICIENT_CREDITS: &str = "INSUFFICIENT_CREDITS";
pub const LEVEL_NOT_PERMITTED: &str = "LEVEL_NOT_PERMITTED";
pub const TOKEN_NOT_FOUND: &str = "TOKEN_NOT_FOUND";
pub const TOKEN_INACTIVE: &str = "TOKEN_INACTIVE";
pub const STORAGE_UPLOAD_FAILED: &str = "STORAGE_UPLOAD_FAILED";
pub const BAD_REQUEST: &str = "BAD_REQUEST";
pub const KEY_LIMIT_REACHED: &str = "KEY_LIMIT_REACHED";
pub const NAME_CHANGE_USED: &str = "NAME_CHANGE_USED";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_BUSY: &str = "DB_BUSY";
pub const OBJECT_WRITE_FAILED: &str = "OBJECT_WRITE_FAILED";
pub const OBJECT_READ_FAILED: &str = "OBJECT_READ_FAILED";
pub const UNKNOWN: &str = "UNKNOWN";

/// Every ScriptGuard error maps to one stable code.
pub trait ScriptGuardErrorCode {
    fn error_code(&self) -> &'static str;
}
