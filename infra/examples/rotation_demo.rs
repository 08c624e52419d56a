//! Refresh-token rotation demo
//!
//! Walks one session lineage through issuance, rotation, and replay
//! detection against a live Redis instance.
//!
//! Run with: cargo run -p ra_infra --example rotation_demo
//! (expects REDIS_URL, defaults to redis://localhost:6379)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use ra_core::domain::entities::token::MintedRefreshToken;
use ra_core::errors::DomainError;
use ra_core::services::minting::{generate_opaque_token, TokenMinter, REFRESH_TOKEN_BYTES};
use ra_core::services::rotation::RotationEngine;
use ra_infra::cache::{RedisClient, RedisTokenStore};
use ra_shared::config::AppConfig;

/// Stand-in for the external minting service
///
/// Access tokens are placeholder strings here; in a deployment this is the
/// adapter in front of the signing backend.
struct DemoMinter {
    refresh_lifetime: Duration,
}

#[async_trait]
impl TokenMinter for DemoMinter {
    async fn mint_access_token(&self, subject_id: &str) -> Result<String, DomainError> {
        Ok(format!("demo-access-{}-{}", subject_id, Uuid::new_v4()))
    }

    async fn mint_refresh_token(
        &self,
        _subject_id: &str,
    ) -> Result<MintedRefreshToken, DomainError> {
        Ok(MintedRefreshToken::new(
            generate_opaque_token(REFRESH_TOKEN_BYTES),
            Utc::now() + self.refresh_lifetime,
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(environment = %config.environment, "starting rotation demo");

    let client = RedisClient::new(&config.cache).await?;
    let store = Arc::new(RedisTokenStore::new(client, &config.token));
    let minter = Arc::new(DemoMinter {
        refresh_lifetime: Duration::seconds(config.token.refresh_token_expiry),
    });
    let engine = RotationEngine::new(store, minter);

    let subject = "demo-user-42";

    // Sign-in: first pair of the lineage.
    let first = engine.issue(subject).await?;
    info!(
        refresh_token = %first.refresh_token,
        expires_in = first.expires_in,
        "issued initial token pair"
    );

    // Legitimate refresh: the presented token is consumed, a new one comes back.
    let second = engine.rotate(&first.refresh_token).await?;
    info!(
        refresh_token = %second.refresh_token,
        "rotated into a new token pair"
    );

    // An attacker (or a retrying client) replays the consumed token.
    match engine.rotate(&first.refresh_token).await {
        Err(err) => warn!(
            code = err.error_code(),
            retryable = err.is_retryable(),
            "replay rejected: {err}"
        ),
        Ok(_) => unreachable!("a consumed token must never rotate again"),
    }

    // The live token still works.
    let subject_id = engine.validate(&second.refresh_token).await?;
    info!(subject_id = %subject_id, "current token validates cleanly");

    engine.revoke(&second.refresh_token).await?;
    info!("lineage revoked, demo complete");

    Ok(())
}
