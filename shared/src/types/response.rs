//! Wire-level response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error payload returned to callers
///
/// Each logical failure of the token core maps to a stable `code` so that
/// clients can branch on it (retry, force re-login, raise an alert) without
/// parsing the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable machine-readable error code
    pub code: String,

    /// Human-readable description
    pub message: String,

    /// Whether retrying the same request may succeed
    pub retryable: bool,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable,
            timestamp: Utc::now(),
        }
    }
}
