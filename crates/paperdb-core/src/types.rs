//! Domain types shared by the retrieval engines and the cache layer.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// A contiguous span of text extracted from one paper, the unit of retrieval.
///
/// - `chunk_id`: globally unique chunk identifier, stable across reindexing
/// - `paper_id`: owning paper
/// - `chunk_index`: ordinal position within the paper, starting at 0
/// - `start_char`/`end_char`: offsets into the source text, `start_char < end_char`
/// - `embedding`: fixed-dimension vector when the chunk has been embedded
///
/// Paper metadata is denormalized onto every chunk so results can be
/// displayed without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub paper_id: String,
    pub chunk_index: usize,
    pub content: String,
    pub start_char: usize,
    pub end_char: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub paper_title: String,
    pub paper_authors: Vec<String>,
    pub paper_categories: Vec<String>,
}

impl Chunk {
    /// True if the owning paper carries at least one of the requested
    /// categories. An empty filter matches everything.
    pub fn in_categories(&self, categories: &[String]) -> bool {
        categories.is_empty() || self.paper_categories.iter().any(|c| categories.contains(c))
    }
}

/// Which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RetrievalSource {
    Vector,
    Keyword,
    Fused,
}

/// A chunk annotated with a retrieval score.
///
/// `score` is method-specific: cosine similarity for vector hits, BM25
/// relevance for keyword hits, the fused total for RRF output. `rank` is the
/// 1-based position within the list that produced the result. Constructed
/// per query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    pub chunk: Chunk,
    pub score: f32,
    pub rank: usize,
    pub source: RetrievalSource,
}
