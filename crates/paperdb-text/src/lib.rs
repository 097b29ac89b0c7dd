//! Tantivy-backed lexical (BM25) index over paper chunks.
//!
//! `index` holds the schema and writer, `search` the [`LexicalIndex`]
//! implementation with field boosts and category filter pushdown.
//!
//! [`LexicalIndex`]: paperdb_core::traits::LexicalIndex

pub mod index;
pub mod schema;
pub mod search;

pub use index::ChunkIndexWriter;
pub use search::TantivyLexicalIndex;
