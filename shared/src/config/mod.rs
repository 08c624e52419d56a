//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `cache` - Redis connection configuration
//! - `environment` - Environment detection and logging configuration
//! - `token` - Token lifetimes and key derivation configuration

pub mod cache;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use cache::CacheConfig;
pub use environment::{Environment, LoggingConfig};
pub use token::TokenConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Redis cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Token lifecycle configuration
    #[serde(default)]
    pub token: TokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            cache: CacheConfig::default(),
            token: TokenConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the full configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: Environment::from_env(),
            cache: CacheConfig::from_env(),
            token: TokenConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}
