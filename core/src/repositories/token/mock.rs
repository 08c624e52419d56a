//! Mock implementation of TokenStore for testing

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::TokenRecord;
use crate::errors::DomainError;

use super::r#trait::TokenStore;

/// One stored entry together with its simulated store-level deadline
#[derive(Debug, Clone)]
struct StoredEntry {
    record: TokenRecord,
    /// Point at which the store would evict the entry; `None` means no TTL
    evict_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    fn is_evicted(&self, now: DateTime<Utc>) -> bool {
        matches!(self.evict_at, Some(deadline) if deadline <= now)
    }
}

/// In-memory token store for testing
///
/// Holding the write lock across the whole read-modify-write makes
/// `invalidate_and_fetch_previous` atomic, mirroring the store-side script
/// of the Redis implementation. Evicted entries behave as absent without
/// being physically removed, like lazy TTL expiry.
pub struct MemoryTokenStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

impl MemoryTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Remaining simulated TTL of a live entry, for assertions
    pub async fn remaining_ttl(&self, token: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        let entry = entries.get(token)?;
        let now = Utc::now();
        if entry.is_evicted(now) {
            return None;
        }
        entry.evict_at.map(|deadline| deadline - now)
    }

    /// Force the simulated eviction deadline of an entry, for expiry tests
    pub async fn set_evict_at(&self, token: &str, evict_at: Option<DateTime<Utc>>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(token) {
            entry.evict_at = evict_at;
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(
        &self,
        token: &str,
        record: &TokenRecord,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            token.to_string(),
            StoredEntry {
                record: record.clone(),
                evict_at: Some(Utc::now() + Duration::seconds(ttl_seconds as i64)),
            },
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<TokenRecord>, DomainError> {
        let entries = self.entries.read().await;
        let now = Utc::now();
        Ok(entries
            .get(token)
            .filter(|entry| !entry.is_evicted(now))
            .map(|entry| entry.record.clone()))
    }

    async fn delete(&self, token: &str) -> Result<bool, DomainError> {
        let mut entries = self.entries.write().await;
        let now = Utc::now();
        match entries.remove(token) {
            Some(entry) => Ok(!entry.is_evicted(now)),
            None => Ok(false),
        }
    }

    async fn invalidate_and_fetch_previous(
        &self,
        token: &str,
    ) -> Result<Option<TokenRecord>, DomainError> {
        // The write lock spans read, flip, and write-back.
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        let entry = match entries.get_mut(token) {
            Some(entry) if !entry.is_evicted(now) => entry,
            _ => return Ok(None),
        };

        let previous = entry.record.clone();
        entry.record = previous.invalidated();
        // evict_at is untouched: the rewrite preserves the remaining TTL.

        Ok(Some(previous))
    }
}
