//! Redis-backed token store
//!
//! Implements the `TokenStore` interface over Redis. Records are stored as
//! JSON under `{prefix}:{token}`; the same derivation is applied to every
//! operation. Invalidation runs as a single server-side Lua script so that
//! the read, the validity flip, and the TTL-preserving write-back form one
//! indivisible unit against the store.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use ra_core::domain::entities::token::TokenRecord;
use ra_core::errors::{DomainError, StoreError};
use ra_core::repositories::token::r#trait::TokenStore;
use ra_shared::config::token::TokenConfig;

use crate::cache::redis_client::RedisClient;
use crate::InfrastructureError;

/// Atomic invalidate-and-fetch script
///
/// Reads the current record, rewrites it with `valid = false` while keeping
/// the exact remaining TTL, and returns the payload as it was before the
/// call. A non-positive TTL means the entry is about to expire; it is
/// rewritten without expiry rather than resurrected with a longer lifetime.
/// A naive get-then-set from the application side would reopen the
/// concurrent-rotation race this script exists to close.
const INVALIDATE_AND_FETCH_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  return false
end
local remaining = redis.call('TTL', KEYS[1])
local record = cjson.decode(current)
record['valid'] = false
local updated = cjson.encode(record)
if remaining > 0 then
  redis.call('SET', KEYS[1], updated, 'EX', remaining)
else
  redis.call('SET', KEYS[1], updated)
end
return current
"#;

static INVALIDATE_SCRIPT: Lazy<Script> = Lazy::new(|| Script::new(INVALIDATE_AND_FETCH_SCRIPT));

/// Redis implementation of the token store
pub struct RedisTokenStore {
    client: RedisClient,
    key_prefix: String,
}

impl RedisTokenStore {
    /// Creates a new store over an established Redis client
    ///
    /// # Arguments
    /// * `client` - Connected Redis client
    /// * `config` - Token configuration; only `key_prefix` is read here
    pub fn new(client: RedisClient, config: &TokenConfig) -> Self {
        Self {
            client,
            key_prefix: config.key_prefix.clone(),
        }
    }

    fn key(&self, token: &str) -> String {
        storage_key(&self.key_prefix, token)
    }
}

#[async_trait]
impl TokenStore for RedisTokenStore {
    async fn put(
        &self,
        token: &str,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        let key = self.key(token);
        let payload = encode_record(record)?;
        self.client
            .set_with_expiry(&key, &payload, ttl_seconds)
            .await
            .map_err(store_unavailable)
    }

    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, DomainError> {
        let key = self.key(token);
        match self.client.get(&key).await.map_err(store_unavailable)? {
            Some(payload) => Ok(Some(parse_record(&key, &payload)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        let key = self.key(token);
        self.client.delete(&key).await.map_err(store_unavailable)
    }

    async fn invalidate_and_fetch_previous(
        &self,
        token: &str,
    ) -> Result<Option<TokenRecord>, DomainError> {
        let key = self.key(token);

        // Unlike the plain operations, the script mutates state: it may only
        // be re-sent when the previous attempt provably never reached the
        // server. Anything indeterminate (timeout, dropped mid-flight) is
        // surfaced instead of retried.
        let mut attempts = 0;
        let mut delay = self.client.retry_delay_ms();
        let previous: Option<String> = loop {
            attempts += 1;
            let mut conn = self.client.connection();
            match INVALIDATE_SCRIPT
                .key(&key)
                .invoke_async::<_, Option<String>>(&mut conn)
                .await
            {
                Ok(previous) => break previous,
                Err(e) if attempts < self.client.max_retries() && e.is_connection_refusal() => {
                    warn!(
                        "Invalidation script not delivered (attempt {}): {}. Retrying in {}ms...",
                        attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    return Err(script_error(&key, e));
                }
            }
        };

        match previous {
            Some(payload) => {
                debug!("Invalidated token record at '{}'", key);
                Ok(Some(parse_record(&key, &payload)?))
            }
            None => Ok(None),
        }
    }
}

/// Physical store key for a token: `{prefix}:{token}`
///
/// The single derivation used by every operation on the store.
pub(crate) fn storage_key(prefix: &str, token: &str) -> String {
    format!("{}:{}", prefix, token)
}

/// Serialize a record into its stored JSON payload
pub(crate) fn encode_record(record: &TokenRecord) -> Result<String, DomainError> {
    serde_json::to_string(record).map_err(|e| DomainError::Internal {
        message: format!("failed to serialize token record: {}", e),
    })
}

/// Decode a stored payload, surfacing corruption as a data-integrity error
///
/// An undecodable payload is never treated as "absent"; that would turn a
/// corrupted store into silent token invalidation.
pub(crate) fn parse_record(key: &str, payload: &str) -> Result<TokenRecord, DomainError> {
    serde_json::from_str(payload).map_err(|e| {
        StoreError::MalformedRecord {
            key: key.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Map an infrastructure failure into the domain-level store error
fn store_unavailable(err: InfrastructureError) -> DomainError {
    StoreError::Unavailable {
        message: err.to_string(),
    }
    .into()
}

/// Classify a failed script invocation
///
/// An error reply from the server means the script itself blew up, which
/// for this script only happens when the stored payload is not decodable
/// JSON; that is corruption, not unavailability, and retrying cannot fix it.
fn script_error(key: &str, err: redis::RedisError) -> DomainError {
    if matches!(
        err.kind(),
        redis::ErrorKind::ResponseError | redis::ErrorKind::ExtensionError
    ) {
        StoreError::MalformedRecord {
            key: key.to_string(),
            message: err.to_string(),
        }
        .into()
    } else {
        store_unavailable(InfrastructureError::Cache(err))
    }
}
