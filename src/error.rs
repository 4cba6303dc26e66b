use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{ipc::ChannelError, state::match_state::ChoiceError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The shared IPC directory could not be written.
    #[error("IPC channel unavailable")]
    Channel(#[source] ChannelError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The choice or mutation is not allowed in the current match state.
    #[error("invalid choice: {0}")]
    InvalidChoice(#[source] ChoiceError),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The feature is switched off in the configuration.
    #[error("{0} is disabled")]
    Disabled(String),
}

impl From<ChannelError> for ServiceError {
    fn from(err: ChannelError) -> Self {
        ServiceError::Channel(err)
    }
}

impl From<ChoiceError> for ServiceError {
    fn from(err: ChoiceError) -> Self {
        match err {
            ChoiceError::UnknownSet(index) => ServiceError::NotFound(format!("set {index}")),
            ChoiceError::UnknownSlot(slot) => ServiceError::NotFound(format!("slot `{slot}`")),
            other => ServiceError::InvalidChoice(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Channel(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidChoice(source) => AppError::Conflict(source.to_string()),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Disabled(feature) => {
                AppError::ServiceUnavailable(format!("{feature} is disabled"))
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
