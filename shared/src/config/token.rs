//! Token lifecycle configuration module

use serde::{Deserialize, Serialize};

/// Token lifetimes and store key derivation settings
///
/// These values are threaded explicitly into the services that need them
/// at construction time; nothing reads them from ambient global state.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Prefix prepended to the refresh token when deriving the store key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604_800, // 7 days
            key_prefix: default_key_prefix(),
        }
    }
}

impl TokenConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let access_token_expiry = std::env::var("ACCESS_TOKEN_EXPIRY_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900);
        let refresh_token_expiry = std::env::var("REFRESH_TOKEN_EXPIRY_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(604_800);
        let key_prefix =
            std::env::var("REFRESH_TOKEN_KEY_PREFIX").unwrap_or_else(|_| default_key_prefix());

        Self {
            access_token_expiry,
            refresh_token_expiry,
            key_prefix,
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86_400;
        self
    }

    /// Set the store key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

fn default_key_prefix() -> String {
    String::from("refresh_token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_default() {
        let config = TokenConfig::default();
        assert_eq!(config.access_token_expiry, 900);
        assert_eq!(config.refresh_token_expiry, 604_800);
        assert_eq!(config.key_prefix, "refresh_token");
    }

    #[test]
    fn test_token_config_builders() {
        let config = TokenConfig::default()
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_days(14)
            .with_key_prefix("session");

        assert_eq!(config.access_token_expiry, 1_800);
        assert_eq!(config.refresh_token_expiry, 14 * 86_400);
        assert_eq!(config.key_prefix, "session");
    }
}
