//! Memoization facade over a [`CacheStore`].
//!
//! Keys are a namespace plus a blake3 hash of every parameter that affects
//! the result (query text, top_k, alpha, category filter), so distinct
//! requests can never collide and identical requests always agree on a key.
//! The store being down is never an error here: `get` degrades to a miss,
//! `set` and invalidation to no-ops, each logged at warning level.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use paperdb_core::traits::CacheStore;

/// ASCII unit separator; cannot appear in a category label or collide with
/// anything the query text could contribute after hashing.
const KEY_SEP: char = '\u{1f}';

pub struct SearchCache {
    store: Arc<dyn CacheStore>,
    namespace: String,
    default_ttl: Duration,
}

impl SearchCache {
    pub fn new(store: Arc<dyn CacheStore>, namespace: impl Into<String>, default_ttl: Duration) -> Self {
        Self { store, namespace: namespace.into(), default_ttl }
    }

    /// Deterministic key for a search request. Categories are sorted so
    /// filter order does not split the cache; alpha is keyed by its exact
    /// bit pattern.
    pub fn key(&self, query: &str, top_k: usize, alpha: f32, categories: Option<&[String]>) -> String {
        let mut sorted: Vec<&str> = categories
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .collect();
        sorted.sort_unstable();
        let material = format!(
            "{query}{KEY_SEP}{top_k}{KEY_SEP}{alpha_bits}{KEY_SEP}{cats}",
            alpha_bits = alpha.to_bits(),
            cats = sorted.join(","),
        );
        format!("{}:{}", self.namespace, blake3::hash(material.as_bytes()).to_hex())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    debug!(key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(key, error = %e, "cache payload failed to decode; treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(e) => {
                warn!(error = %e, "cache store unavailable; treating as miss");
                None
            }
        }
    }

    /// Stores a payload under `key`, overwriting any previous entry.
    /// `ttl` falls back to the configured default.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "cache payload failed to encode; skipping store");
                return;
            }
        };
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.store.set(key, bytes, ttl).await {
            warn!(error = %e, "cache store unavailable; skipping store");
        }
    }

    /// Deletes entries matching a glob pattern, returning how many went.
    /// The pattern is taken as-is so callers can target any namespace.
    pub async fn clear_by_pattern(&self, pattern: &str) -> usize {
        match self.store.delete_matching(pattern).await {
            Ok(count) => {
                debug!(pattern, count, "cache invalidation");
                count
            }
            Err(e) => {
                warn!(error = %e, "cache store unavailable; invalidation skipped");
                0
            }
        }
    }

    /// Drops every entry in this cache's namespace, leaving other
    /// namespaces (e.g. an LLM answer cache) untouched. Meant for periodic
    /// maintenance after reindexing.
    pub async fn clear_all(&self) -> usize {
        let pattern = format!("{}:*", self.namespace);
        self.clear_by_pattern(&pattern).await
    }
}
