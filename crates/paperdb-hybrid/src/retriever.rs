//! The retrieval orchestrator: the single entry point callers use to turn
//! a question into a ranked, deduplicated, filtered list of chunks.

use anyhow::anyhow;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use paperdb_core::config::RetrievalSettings;
use paperdb_core::error::{Result, RetrievalError};
use paperdb_core::traits::{EmbeddingProvider, LexicalIndex, VectorIndex};
use paperdb_core::types::RankedResult;

use crate::fusion::reciprocal_rank_fusion;

/// Per-request overrides. Anything unset falls back to [`RetrievalSettings`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Weight of the vector ranking, in [0, 1].
    pub alpha: Option<f32>,
    /// Restrict results to papers carrying at least one of these categories.
    pub categories: Option<Vec<String>>,
    /// Overall deadline for this request.
    pub timeout: Option<Duration>,
}

/// Issues the embedding call, runs both index searches concurrently, fuses
/// the rankings and truncates. Stateless per call; collaborators are
/// injected at construction. Retry policy lives in the index clients, not
/// here: each sub-call is treated as at-most-once.
pub struct HybridRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    vector: Arc<dyn VectorIndex>,
    lexical: Arc<dyn LexicalIndex>,
    settings: RetrievalSettings,
}

impl HybridRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector: Arc<dyn VectorIndex>,
        lexical: Arc<dyn LexicalIndex>,
        settings: RetrievalSettings,
    ) -> Self {
        Self { embedder, vector, lexical, settings }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        self.search_with(query, top_k, &SearchOptions::default()).await
    }

    pub async fn search_with(
        &self,
        query: &str,
        top_k: usize,
        opts: &SearchOptions,
    ) -> Result<Vec<RankedResult>> {
        if query.trim().is_empty() {
            return Err(RetrievalError::InvalidArgument("query must not be empty".to_string()));
        }
        if top_k == 0 {
            return Err(RetrievalError::InvalidArgument("top_k must be positive".to_string()));
        }
        let alpha = opts.alpha.unwrap_or(self.settings.alpha);
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RetrievalError::InvalidArgument(format!(
                "alpha must be within [0, 1], got {alpha}"
            )));
        }
        let deadline = opts.timeout.unwrap_or_else(|| self.settings.request_timeout());
        match timeout(deadline, self.run(query, top_k, alpha, opts)).await {
            Ok(result) => result,
            Err(_) => Err(RetrievalError::Timeout(deadline)),
        }
    }

    async fn run(
        &self,
        query: &str,
        top_k: usize,
        alpha: f32,
        opts: &SearchOptions,
    ) -> Result<Vec<RankedResult>> {
        let started = Instant::now();
        let categories = opts.categories.as_deref().filter(|cats| !cats.is_empty());

        // The embedding is a hard dependency: without it there is no
        // semantic side to fuse, so the whole request fails.
        let embed_timeout = self.settings.embed_timeout();
        let query_vec = match timeout(embed_timeout, self.embedder.embed(query)).await {
            Ok(Ok(vec)) => vec,
            Ok(Err(e)) => return Err(RetrievalError::EmbeddingUnavailable(e)),
            Err(_) => {
                return Err(RetrievalError::EmbeddingUnavailable(anyhow!(
                    "embedding timed out after {embed_timeout:?}"
                )))
            }
        };

        // Over-fetch so fusion can recover chunks that rank low in one
        // modality but high in the other.
        let fetch_k = top_k.saturating_mul(self.settings.overfetch_factor.max(1));
        let index_timeout = self.settings.index_timeout();

        let vector_search = async {
            let call_started = Instant::now();
            let outcome = match timeout(
                index_timeout,
                self.vector.search(&query_vec, fetch_k, categories),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(anyhow!("vector search timed out after {index_timeout:?}")),
            };
            (outcome, call_started.elapsed())
        };
        let keyword_search = async {
            let call_started = Instant::now();
            let outcome =
                match timeout(index_timeout, self.lexical.search(query, fetch_k, categories))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("keyword search timed out after {index_timeout:?}")),
                };
            (outcome, call_started.elapsed())
        };
        let ((vector_outcome, vector_elapsed), (keyword_outcome, keyword_elapsed)) =
            tokio::join!(vector_search, keyword_search);
        debug!(?vector_elapsed, ?keyword_elapsed, "retrieval backends answered");

        // Both outcomes are in hand before deciding: one failure degrades,
        // two failures abort.
        let (vector_hits, keyword_hits) = match (vector_outcome, keyword_outcome) {
            (Ok(vector_hits), Ok(keyword_hits)) => (vector_hits, keyword_hits),
            (Ok(vector_hits), Err(e)) => {
                warn!(error = %e, "keyword search failed; degraded to vector results only");
                (vector_hits, Vec::new())
            }
            (Err(e), Ok(keyword_hits)) => {
                warn!(error = %e, "vector search failed; degraded to keyword results only");
                (Vec::new(), keyword_hits)
            }
            (Err(vector_err), Err(keyword_err)) => {
                return Err(RetrievalError::RetrievalUnavailable {
                    vector: vector_err.to_string(),
                    keyword: keyword_err.to_string(),
                })
            }
        };

        let mut results =
            reciprocal_rank_fusion(vector_hits, keyword_hits, alpha, self.settings.rrf_k);
        results.truncate(top_k);
        info!(
            top_k,
            returned = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "hybrid search complete"
        );
        Ok(results)
    }
}
