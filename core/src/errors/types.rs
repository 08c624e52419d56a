//! Domain-specific error types for token rotation and storage
//!
//! This module provides error type definitions for refresh-token validation,
//! rotation, and token-store access. Each variant maps to a stable error code
//! consumed by the request-handling layer in front of this crate.

use thiserror::Error;

/// Refresh-token lifecycle errors
///
/// The four variants imply different client behavior and are never collapsed
/// into a single generic failure: retry does not help any of them, but only
/// `TokenAlreadyInvalidated` is a compromise signal worth alerting on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No record at all: never issued, explicitly deleted, or reaped by the
    /// store after physical expiry.
    #[error("Refresh token not found")]
    TokenNotFound,

    /// The record exists but has already been rotated. Presenting such a
    /// token again is the theft/replay signal of the rolling-token scheme.
    #[error("Refresh token already invalidated")]
    TokenAlreadyInvalidated,

    /// The record exists and is still marked valid, but its logical expiry
    /// has passed. Store-level TTL eviction is only a backstop.
    #[error("Refresh token expired")]
    TokenExpired,

    /// The presented token was invalidated, but no replacement could be
    /// produced. Terminal for the session lineage; the client must sign in
    /// again.
    #[error("Token minting failed after invalidation: {message}")]
    MintingFailure { message: String },
}

impl TokenError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::TokenNotFound => "TOKEN_NOT_FOUND",
            TokenError::TokenAlreadyInvalidated => "TOKEN_ALREADY_INVALIDATED",
            TokenError::TokenExpired => "TOKEN_EXPIRED",
            TokenError::MintingFailure { .. } => "MINTING_FAILURE",
        }
    }
}

/// Token-store access errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time. Safe to
    /// retry the whole operation; must never be read as "token invalid".
    #[error("Token store unavailable: {message}")]
    Unavailable { message: String },

    /// A stored payload could not be decoded into a token record. Data
    /// integrity problem; never silently coerced into "not found".
    #[error("Malformed token record at key '{key}': {message}")]
    MalformedRecord { key: String, message: String },
}

impl StoreError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Unavailable { .. } => "STORE_UNAVAILABLE",
            StoreError::MalformedRecord { .. } => "MALFORMED_RECORD",
        }
    }
}
