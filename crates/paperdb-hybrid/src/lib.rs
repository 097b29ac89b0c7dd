//! Hybrid retrieval: Reciprocal Rank Fusion over concurrent vector and
//! keyword searches, with an optional cache front.

pub mod cached;
pub mod fusion;
pub mod retriever;

pub use cached::CachedRetriever;
pub use fusion::reciprocal_rank_fusion;
pub use retriever::{HybridRetriever, SearchOptions};
