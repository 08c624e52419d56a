//! Token entities for refresh-token rotation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state of one refresh token
///
/// The record is the single source of truth for whether a refresh token is
/// still usable. It is stored in the token store under the token's own
/// opaque value, so one lookup answers both "does this token exist" and
/// "is it still valid".
///
/// Invariant: `valid` makes a one-way transition from `true` to `false`.
/// Rotation is not reversible; no API on this type sets `valid` back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Identifier of the principal the token was issued to
    ///
    /// Stable across rotations for one session lineage.
    pub subject_id: String,

    /// `true` while the token is live, `false` once rotated or invalidated
    pub valid: bool,

    /// Absolute logical expiry, authoritative over the store-level TTL
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Creates a new live record for a freshly issued refresh token
    pub fn new(subject_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            subject_id: subject_id.into(),
            valid: true,
            expires_at,
        }
    }

    /// Pure usability predicate: live and unexpired at `now`
    ///
    /// Store-level TTL is only a backstop; callers must pass a wall-clock
    /// `now` and rely on this comparison for logical expiry.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.valid && self.expires_at > now
    }

    /// Returns a copy of this record with `valid` flipped to `false`
    ///
    /// Everything else, including `expires_at`, is carried over unchanged
    /// so an invalidated record can never outlive its intended expiry.
    pub fn invalidated(&self) -> Self {
        Self {
            valid: false,
            ..self.clone()
        }
    }

    /// Time remaining until logical expiry, `None` once passed
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.expires_at > now {
            Some(self.expires_at - now)
        } else {
            None
        }
    }
}

/// A freshly minted opaque refresh token together with its expiry
///
/// Produced by the external minting capability; the engine persists a
/// matching [`TokenRecord`] under `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedRefreshToken {
    /// High-entropy opaque token string
    pub token: String,

    /// Absolute expiry chosen by the minter
    pub expires_at: DateTime<Utc>,
}

impl MintedRefreshToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }
}

/// Token pair returned to the caller after issuance or rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token
    pub access_token: String,

    /// Opaque refresh token, always different from the one presented
    pub refresh_token: String,

    /// Remaining lifetime of the refresh token in seconds
    #[serde(rename = "expiresInSeconds")]
    pub expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_usable() {
        let now = Utc::now();
        let record = TokenRecord::new("subject-1", now + Duration::days(7));

        assert!(record.valid);
        assert!(record.is_usable(now));
        assert_eq!(record.subject_id, "subject-1");
    }

    #[test]
    fn test_invalidated_record_is_never_usable() {
        let now = Utc::now();
        let record = TokenRecord::new("subject-1", now + Duration::days(7));

        let invalidated = record.invalidated();

        assert!(!invalidated.valid);
        assert!(!invalidated.is_usable(now));
        // Expiry far in the future must not matter once the flag is down.
        assert!(!invalidated.is_usable(now - Duration::days(365)));
    }

    #[test]
    fn test_invalidation_preserves_expiry_and_subject() {
        let now = Utc::now();
        let record = TokenRecord::new("subject-1", now + Duration::days(7));

        let invalidated = record.invalidated();

        assert_eq!(invalidated.expires_at, record.expires_at);
        assert_eq!(invalidated.subject_id, record.subject_id);
    }

    #[test]
    fn test_expired_record_is_not_usable() {
        let now = Utc::now();
        let record = TokenRecord::new("subject-1", now - Duration::seconds(1));

        assert!(record.valid);
        assert!(!record.is_usable(now));
    }

    #[test]
    fn test_remaining_ttl() {
        let now = Utc::now();
        let record = TokenRecord::new("subject-1", now + Duration::seconds(90));

        let remaining = record.remaining_ttl(now).unwrap();
        assert_eq!(remaining.num_seconds(), 90);

        let expired = TokenRecord::new("subject-1", now - Duration::seconds(1));
        assert!(expired.remaining_ttl(now).is_none());
    }

    #[test]
    fn test_record_wire_format() {
        let expires_at = "2030-01-02T03:04:05Z".parse::<DateTime<Utc>>().unwrap();
        let record = TokenRecord::new("runner-7", expires_at);

        let json = serde_json::to_value(&record).unwrap();

        // The stored payload must use exactly these field names.
        assert_eq!(json["subjectId"], "runner-7");
        assert_eq!(json["valid"], true);
        assert_eq!(json["expiresAt"], "2030-01-02T03:04:05Z");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_record_round_trip() {
        let record = TokenRecord::new("subject-1", Utc::now() + Duration::days(7));

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: TokenRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_token_pair_serialization() {
        let pair = TokenPair::new("access".to_string(), "refresh".to_string(), 3600);

        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["refreshToken"], "refresh");
        assert_eq!(json["expiresInSeconds"], 3600);

        let deserialized: TokenPair = serde_json::from_value(json).unwrap();
        assert_eq!(pair, deserialized);
    }
}
