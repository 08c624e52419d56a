//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{StoreError, TokenError};

use ra_shared::types::response::ErrorResponse;
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Token(e) => e.error_code(),
            DomainError::Store(e) => e.error_code(),
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether retrying the same operation may succeed
    ///
    /// Only transient store failures qualify; every token-lifecycle error is
    /// a final verdict on the presented token.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Store(StoreError::Unavailable { .. }))
    }

    /// Convert into the wire-level error payload
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse::new(self.error_code(), self.to_string(), self.is_retryable())
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        err.to_response()
    }
}
