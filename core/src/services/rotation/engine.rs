//! Rotation engine implementation

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::entities::token::{TokenPair, TokenRecord};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::token::r#trait::TokenStore;
use crate::services::minting::TokenMinter;

/// State machine for refresh-token rotation
///
/// A refresh token moves through three externally observable states:
/// Issued (valid, unexpired) -> Rotated/Invalidated -> Absent. Only Issued
/// accepts a transition; every other state rejects. The store's atomic
/// invalidate-and-fetch primitive is what keeps concurrent rotations of the
/// same token from both succeeding.
pub struct RotationEngine<S, M>
where
    S: TokenStore + 'static,
    M: TokenMinter + 'static,
{
    store: Arc<S>,
    minter: Arc<M>,
}

impl<S, M> Clone for RotationEngine<S, M>
where
    S: TokenStore + 'static,
    M: TokenMinter + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            minter: Arc::clone(&self.minter),
        }
    }
}

impl<S, M> RotationEngine<S, M>
where
    S: TokenStore + 'static,
    M: TokenMinter + 'static,
{
    /// Creates a new rotation engine
    ///
    /// # Arguments
    /// * `store` - TTL-bounded token record storage
    /// * `minter` - External capability producing new token pairs
    pub fn new(store: Arc<S>, minter: Arc<M>) -> Self {
        Self { store, minter }
    }

    /// Issues the first token pair of a session lineage (sign-in path)
    ///
    /// Mints an access token and an opaque refresh token for the subject and
    /// persists an Issued record under the refresh token, with the store TTL
    /// matching the minted lifetime.
    pub async fn issue(&self, subject_id: &str) -> DomainResult<TokenPair> {
        let access_token = self.minter.mint_access_token(subject_id).await?;
        let minted = self.minter.mint_refresh_token(subject_id).await?;

        let record = TokenRecord::new(subject_id, minted.expires_at);
        let ttl_seconds = fresh_ttl_seconds(&record)?;
        self.store.put(&minted.token, &record, ttl_seconds).await?;

        debug!(subject_id, expires_at = %record.expires_at, "issued refresh token");

        Ok(TokenPair::new(
            access_token,
            minted.token,
            ttl_seconds as i64,
        ))
    }

    /// Rotates a presented refresh token into a new token pair
    ///
    /// Exactly one store write flips the old record to invalid and exactly
    /// one creates the new record. The old token is invalidated *before*
    /// minting: a failure after that point is terminal for the session
    /// lineage, never an opportunity to reuse the presented token.
    ///
    /// # Errors
    /// * [`TokenError::TokenNotFound`] - no record stored for the token
    /// * [`TokenError::TokenAlreadyInvalidated`] - the token was already
    ///   rotated; replaying it is treated as a compromise signal
    /// * [`TokenError::TokenExpired`] - record still present but logically
    ///   expired
    /// * [`TokenError::MintingFailure`] - the old token is burned and no
    ///   replacement exists; the caller must re-authenticate
    pub async fn rotate(&self, presented_token: &str) -> DomainResult<TokenPair> {
        let record = self
            .store
            .get(presented_token)
            .await?
            .ok_or(TokenError::TokenNotFound)?;

        let now = Utc::now();
        if !record.valid {
            warn!(
                subject_id = %record.subject_id,
                "replay of an already rotated refresh token"
            );
            return Err(TokenError::TokenAlreadyInvalidated.into());
        }
        if record.expires_at <= now {
            debug!(subject_id = %record.subject_id, "refresh token past logical expiry");
            return Err(TokenError::TokenExpired.into());
        }

        // Once invalidation starts, the sequence must run to completion even
        // if the caller's future is dropped mid-request; abandoning it could
        // burn the old token without ever persisting a replacement. The
        // spawned task is detached from caller cancellation.
        let store = Arc::clone(&self.store);
        let minter = Arc::clone(&self.minter);
        let token = presented_token.to_string();
        let handle = tokio::spawn(Self::invalidate_and_reissue(store, minter, token));

        handle.await.map_err(|e| DomainError::Internal {
            message: format!("rotation task aborted: {e}"),
        })?
    }

    /// Steps 4-8 of a rotation: atomic invalidation, minting, persistence
    async fn invalidate_and_reissue(
        store: Arc<S>,
        minter: Arc<M>,
        presented_token: String,
    ) -> DomainResult<TokenPair> {
        let previous = store
            .invalidate_and_fetch_previous(&presented_token)
            .await?
            .ok_or(TokenError::TokenNotFound)?;

        if !previous.valid {
            // A concurrent rotation of the same token won the atomic step.
            warn!(
                subject_id = %previous.subject_id,
                "concurrent rotation lost the race, rejecting duplicate"
            );
            return Err(TokenError::TokenAlreadyInvalidated.into());
        }

        let now = Utc::now();
        if previous.expires_at <= now {
            return Err(TokenError::TokenExpired.into());
        }

        // The subject comes from the record; the token string is opaque and
        // carries no identity.
        let subject_id = previous.subject_id;

        let access_token = minter
            .mint_access_token(&subject_id)
            .await
            .map_err(|e| minting_failure(&subject_id, e))?;
        let minted = minter
            .mint_refresh_token(&subject_id)
            .await
            .map_err(|e| minting_failure(&subject_id, e))?;

        let record = TokenRecord::new(subject_id.clone(), minted.expires_at);
        let ttl_seconds = fresh_ttl_seconds(&record)?;
        store
            .put(&minted.token, &record, ttl_seconds)
            .await
            .map_err(|e| minting_failure(&subject_id, e))?;

        info!(subject_id = %subject_id, "rotated refresh token");

        Ok(TokenPair::new(
            access_token,
            minted.token,
            ttl_seconds as i64,
        ))
    }

    /// Read-only liveness check, returning the subject of a usable token
    ///
    /// Does not rotate or otherwise mutate the record; intended for
    /// authorization checks that need to confirm a token without consuming
    /// it.
    pub async fn validate(&self, presented_token: &str) -> DomainResult<String> {
        let record = self
            .store
            .get(presented_token)
            .await?
            .ok_or(TokenError::TokenNotFound)?;

        let now = Utc::now();
        if record.is_usable(now) {
            return Ok(record.subject_id);
        }
        if !record.valid {
            Err(TokenError::TokenAlreadyInvalidated.into())
        } else {
            Err(TokenError::TokenExpired.into())
        }
    }

    /// Explicitly deletes a refresh token's record (logout path)
    ///
    /// # Returns
    /// * `Ok(true)` - a record existed and was removed
    /// * `Ok(false)` - nothing was stored under this token
    pub async fn revoke(&self, presented_token: &str) -> DomainResult<bool> {
        let removed = self.store.delete(presented_token).await?;
        if removed {
            info!("refresh token revoked");
        }
        Ok(removed)
    }
}

/// Store TTL for a freshly minted record
///
/// The TTL must never exceed the time remaining until `expires_at`; a minter
/// handing out an already-expired token is an internal fault, not a token
/// state.
fn fresh_ttl_seconds(record: &TokenRecord) -> DomainResult<u64> {
    record
        .remaining_ttl(Utc::now())
        .map(|d| d.num_seconds().max(1) as u64)
        .ok_or_else(|| DomainError::Internal {
            message: "minted refresh token is already expired".to_string(),
        })
}

/// Wraps any failure after the point of no return
///
/// The presented token is already invalidated, so whatever went wrong while
/// producing or persisting its successor leaves the caller with the same
/// remedy: start a new session.
fn minting_failure(subject_id: &str, cause: DomainError) -> DomainError {
    warn!(
        subject_id,
        error = %cause,
        "rotation failed after invalidation, session lineage is lost"
    );
    TokenError::MintingFailure {
        message: cause.to_string(),
    }
    .into()
}
