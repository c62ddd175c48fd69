//! Error taxonomy: engine-level [`ServiceError`] mapped onto HTTP responses
//! via [`AppError`].

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, engine::machine::InvalidTransition};

/// Errors surfaced by service layer operations. All of them are recoverable
/// at the call site; a rejected operation leaves the persisted records
/// untouched.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed mid-operation.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Referenced game, team, player, or word is absent.
    #[error("not found: {0}")]
    NotFound(String),
    /// Mutation attempted by a non-owning actor.
    #[error("not owner: {0}")]
    NotOwner(String),
    /// Word submission over the per-player limit.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The requested state-machine transition is illegal from the current
    /// state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    /// The start verification gate rejected the game; every violated rule is
    /// carried so the caller can present a complete checklist.
    #[error("preconditions failed ({} problems)", .0.len())]
    PreconditionFailed(Vec<String>),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        ServiceError::InvalidTransition(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Actor does not own the targeted record.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with the current game state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Start checklist not satisfied; details list every violated rule.
    #[error("preconditions failed")]
    PreconditionFailed(Vec<String>),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::NotOwner(message) => AppError::Forbidden(message),
            ServiceError::QuotaExceeded(message) => AppError::Conflict(message),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidTransition(message) => AppError::Conflict(message),
            ServiceError::PreconditionFailed(problems) => AppError::PreconditionFailed(problems),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PreconditionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let details = match &self {
            AppError::PreconditionFailed(problems) => problems.clone(),
            _ => Vec::new(),
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            details,
        });

        (status, payload).into_response()
    }
}
