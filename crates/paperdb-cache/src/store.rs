//! In-memory TTL key/value store.
//!
//! The shared backing store of a deployment is typically a networked
//! Redis-like service; this implementation keeps the same contract
//! (TTL expiry, glob deletion, last-write-wins) in process memory for
//! single-node deployments and tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use paperdb_core::traits::CacheStore;

struct StoredEntry {
    payload: Vec<u8>,
    expires_at: DateTime<Utc>,
}

impl StoredEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active eviction for periodic maintenance. Lookups already treat
    /// expired entries as absent; this just reclaims their memory.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(_) => return 0,
        };
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache store poisoned"))?;
        let now = Utc::now();
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.payload.clone()));
            }
        }
        // Lazy expiry: a dead entry is dropped on the way out so it is
        // never observable.
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).map_err(|e| anyhow!("ttl out of range: {e}"))?;
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache store poisoned"))?;
        entries.insert(key.to_string(), StoredEntry { payload: value, expires_at });
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize> {
        let matcher = glob::Pattern::new(pattern)?;
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache store poisoned"))?;
        let before = entries.len();
        entries.retain(|key, _| !matcher.matches(key));
        Ok(before - entries.len())
    }
}
