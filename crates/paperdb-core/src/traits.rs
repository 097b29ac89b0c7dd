//! Collaborator seams consumed by the retrieval orchestrator and cache layer.
//!
//! Implementations live in their own crates (tantivy, LanceDB, in-memory
//! store) and are injected at construction time. All methods return
//! `anyhow::Result`; the orchestrator maps failures into its typed taxonomy.

use crate::types::RankedResult;
use async_trait::async_trait;
use std::time::Duration;

/// Text to fixed-dimension vector. Fails atomically, no partial results.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// k-NN search over chunk embeddings. Results are ordered by descending
/// similarity (cosine). `categories`, when present, restricts results to
/// chunks whose paper carries at least one listed category.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(
        &self,
        query_vec: &[f32],
        top_k: usize,
        categories: Option<&[String]>,
    ) -> anyhow::Result<Vec<RankedResult>>;
}

/// BM25-style full-text search over chunk content. Results are ordered by
/// descending lexical relevance. Same category-filter contract as
/// [`VectorIndex`].
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        categories: Option<&[String]>,
    ) -> anyhow::Result<Vec<RankedResult>>;
}

/// Generic key/value store with TTL expiry and glob pattern deletion, the
/// backing authority for the cache layer. A `get` must never return an
/// entry whose TTL has elapsed.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> anyhow::Result<()>;
    async fn delete_matching(&self, pattern: &str) -> anyhow::Result<usize>;
}
