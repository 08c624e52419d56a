//! # RollAuth Core
//!
//! Core business logic and domain layer for the RollAuth backend.
//! This crate contains the refresh-token record model, the rotation engine,
//! the token-store repository interface, and the error types that form the
//! foundation of the application architecture.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
