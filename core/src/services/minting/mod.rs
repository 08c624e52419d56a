//! Token minting boundary
//!
//! The rotation engine treats minting as an external capability: how an
//! access token is signed and verified is not this crate's concern. The
//! trait below is the entire contract, plus a helper for producing opaque
//! refresh-token strings with enough entropy to be infeasible to guess.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

use crate::domain::entities::token::MintedRefreshToken;
use crate::errors::DomainError;

/// Number of random bytes in a generated opaque refresh token
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// External capability that produces new tokens for a subject
///
/// Implementations may call out to a signing service or library; both
/// operations are modeled as async I/O.
#[async_trait]
pub trait TokenMinter: Send + Sync {
    /// Mint a short-lived access token for the subject
    async fn mint_access_token(&self, subject_id: &str) -> Result<String, DomainError>;

    /// Mint a new opaque refresh token and choose its absolute expiry
    ///
    /// The returned token must never repeat a previously issued value; the
    /// engine persists the matching record under it verbatim.
    async fn mint_refresh_token(&self, subject_id: &str)
        -> Result<MintedRefreshToken, DomainError>;
}

/// Generate a URL-safe opaque token from `num_bytes` of OS randomness
///
/// The output carries no embedded identity; the subject is only ever
/// recoverable through the stored record.
pub fn generate_opaque_token(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_opaque_token_is_url_safe() {
        let token = generate_opaque_token(REFRESH_TOKEN_BYTES);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_opaque_token_length_tracks_entropy() {
        // 32 bytes -> ceil(32 * 4 / 3) = 43 base64 chars without padding
        assert_eq!(generate_opaque_token(32).len(), 43);
        assert_eq!(generate_opaque_token(16).len(), 22);
    }

    #[test]
    fn test_opaque_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000)
            .map(|_| generate_opaque_token(REFRESH_TOKEN_BYTES))
            .collect();
        assert_eq!(tokens.len(), 1000);
    }
}
