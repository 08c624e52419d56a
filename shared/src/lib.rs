//! Shared utilities and common types for RollAuth server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Wire-level response structures

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{AppConfig, CacheConfig, Environment, LoggingConfig, TokenConfig};
pub use types::ErrorResponse;
