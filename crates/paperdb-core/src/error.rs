use std::time::Duration;
use thiserror::Error;

/// Failure taxonomy of the retrieval orchestrator.
///
/// A single failed search backend is not an error: the orchestrator
/// degrades to the surviving list and logs a warning. Cache failures never
/// surface here at all; the cache layer converts them to misses.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(#[source] anyhow::Error),

    #[error("All retrieval backends failed (vector: {vector}; keyword: {keyword})")]
    RetrievalUnavailable { vector: String, keyword: String },

    #[error("Search timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
