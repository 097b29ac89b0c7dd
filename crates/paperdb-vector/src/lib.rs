//! LanceDB-backed vector (k-NN) index over chunk embeddings.
//!
//! `writer` ingests chunks with their embeddings and handles cascade
//! deletion by paper; `search` implements the [`VectorIndex`] collaborator.
//!
//! [`VectorIndex`]: paperdb_core::traits::VectorIndex

pub mod schema;
pub mod search;
pub mod writer;

pub use search::LanceVectorIndex;
pub use writer::LanceChunkWriter;
