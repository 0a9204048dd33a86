//! Error type returned by every domain service.

/// Failure of a domain operation. The REST layer maps each variant to one
/// HTTP status; storage failures keep their full `anyhow` chain for logging.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<super::validation::ValidationError> for DomainError {
    fn from(err: super::validation::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
