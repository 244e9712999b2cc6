//! HTTP mapping of orchestrator errors.
//!
//! Every failure leaves as `{"error": "<message>"}` with a status chosen by
//! error category. Messages come from `OperationError`'s `Display`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use scriptguard_core::errors::{OperationError, ScriptGuardErrorCode};
use serde::Serialize;
use tracing::error;

/// Orphan-rule wrapper so `OperationError` can be an actix response.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub OperationError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(OperationError::bad_request(message))
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            // Policy rejections share 400 with malformed input; the
            // message text tells them apart.
            OperationError::BadRequest(_)
            | OperationError::TokenNotFound
            | OperationError::TokenInactive
            | OperationError::LevelNotPermitted { .. }
            | OperationError::KeyLimitReached { .. }
            | OperationError::NameChangeUsed => StatusCode::BAD_REQUEST,
            OperationError::Unauthenticated => StatusCode::UNAUTHORIZED,
            OperationError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            OperationError::ProfileNotFound => StatusCode::NOT_FOUND,
            OperationError::StorageUploadFailed { .. }
            | OperationError::Storage(_)
            | OperationError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error_code = self.0.error_code(), error = ?self.0, "request failed");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: self.0.to_string(),
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
