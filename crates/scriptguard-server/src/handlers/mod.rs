//! HTTP handlers. Each module registers its own routes via `configure`.
//!
//! The orchestrator is synchronous and talks to SQLite, so every call is
//! pushed onto actix's blocking pool.

pub mod account;
pub mod keys;
pub mod operations;

use actix_web::web::{self, ReqData};
use scriptguard_core::{CallerIdentity, OperationError, OperationResult};

use crate::errors::{ApiError, ApiResult};

/// Caller identity left by the auth middleware, if any.
pub(crate) fn caller(identity: Option<ReqData<CallerIdentity>>) -> Option<CallerIdentity> {
    identity.map(ReqData::into_inner)
}

pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> OperationResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| ApiError(OperationError::Unknown(e.to_string())))?
        .map_err(ApiError::from)
}
