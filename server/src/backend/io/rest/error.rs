//! Conversion of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use shared::ErrorResponse;

use crate::backend::domain::DomainError;

/// Error returned by REST handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, "validation_error", message),
            DomainError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, "not_found", message),
            DomainError::Conflict(message) => Self::new(StatusCode::CONFLICT, "conflict", message),
            DomainError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, "forbidden", message),
            DomainError::InvalidCredentials => Self::new(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                DomainError::InvalidCredentials.to_string(),
            ),
            DomainError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                Self::internal("Something went wrong. Please try again.")
            }
        }
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        error!("Session store failure: {}", err);
        Self::internal("Session could not be read or written")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
