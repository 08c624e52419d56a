//! Token store trait defining the interface for refresh token persistence.

use async_trait::async_trait;

use crate::domain::entities::token::TokenRecord;
use crate::errors::DomainError;

/// Repository trait for TTL-bounded token record storage
///
/// This trait defines the contract for keeping refresh-token records in a
/// networked key-value store. Operations are keyed by the raw opaque token
/// string; implementations own the derivation of the physical store key and
/// must apply it uniformly to every operation.
///
/// # Concurrency
/// Requests for the same token value may race (client retries, or an
/// attacker replaying a captured token alongside its legitimate owner).
/// No in-process locking closes that race; only the store-side atomicity of
/// [`invalidate_and_fetch_previous`](TokenStore::invalidate_and_fetch_previous)
/// does.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Write a record with an explicit TTL, overwriting any existing entry
    ///
    /// Used on initial issuance and when persisting the successor record
    /// after a successful rotation.
    ///
    /// # Arguments
    /// * `token` - The opaque refresh token the record belongs to
    /// * `record` - The record to persist
    /// * `ttl_seconds` - Store-level time to live; must not exceed the time
    ///   remaining until the record's `expires_at`
    async fn put(
        &self,
        token: &str,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), DomainError>;

    /// Point lookup, free of side effects
    ///
    /// # Returns
    /// * `Ok(Some(record))` - A record is stored under this token
    /// * `Ok(None)` - Nothing stored (never issued, deleted, or evicted)
    /// * `Err(DomainError)` - Store unreachable, or the stored payload could
    ///   not be decoded (surfaced as a data-integrity error, never as `None`)
    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, DomainError>;

    /// Remove the entry for a token
    ///
    /// # Returns
    /// * `Ok(true)` - An entry existed and was removed
    /// * `Ok(false)` - Nothing was stored under this token
    async fn delete(&self, token: &str) -> Result<bool, DomainError>;

    /// Atomically invalidate the stored record and return its prior state
    ///
    /// In one indivisible unit against the store: read the current record,
    /// rewrite it with `valid = false` while preserving the exact remaining
    /// TTL (writing without expiry only when the entry carries none or it is
    /// already non-positive), and return the record as it was *before* the
    /// call.
    ///
    /// When two rotations of the same token race, exactly one caller
    /// receives a snapshot with `valid == true`; every other caller observes
    /// the already-invalidated state and must reject. A plain get-then-set
    /// from the application side reintroduces exactly the race this
    /// operation exists to close.
    ///
    /// # Returns
    /// * `Ok(Some(record))` - The pre-invalidation snapshot
    /// * `Ok(None)` - No record stored; no side effects
    async fn invalidate_and_fetch_previous(
        &self,
        token: &str,
    ) -> Result<Option<TokenRecord>, DomainError>;
}
