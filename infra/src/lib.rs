//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the RollAuth
//! application. It provides the concrete, Redis-backed implementation of the
//! token store interface defined in `ra_core`, including the server-side
//! atomic invalidate-and-fetch script that closes the concurrent-rotation
//! race.

use thiserror::Error;

// Re-export core types for convenience
pub use ra_core::errors::*;

/// Cache module - Redis client and the token store adapter
pub mod cache;

/// Errors raised by infrastructure adapters
///
/// These are mapped into [`ra_core::errors::StoreError`] at the adapter
/// boundary; nothing above the adapters handles a raw Redis error.
#[derive(Error, Debug)]
pub enum InfrastructureError {
    /// Underlying Redis failure
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Invalid configuration, such as an unparseable Redis URL
    #[error("Configuration error: {0}")]
    Config(String),
}
