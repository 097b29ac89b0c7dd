use tempfile::TempDir;

use paperdb_core::traits::{EmbeddingProvider, VectorIndex};
use paperdb_core::types::Chunk;
use paperdb_embed::HashEmbedder;
use paperdb_vector::{LanceChunkWriter, LanceVectorIndex};

const DIM: usize = 64;
const TABLE: &str = "paper_chunks_test";

fn chunk(chunk_id: &str, paper_id: &str, content: &str, categories: &[&str]) -> Chunk {
    Chunk {
        chunk_id: chunk_id.to_string(),
        paper_id: paper_id.to_string(),
        chunk_index: 0,
        content: content.to_string(),
        start_char: 0,
        end_char: content.len(),
        embedding: None,
        paper_title: format!("Paper {paper_id}"),
        paper_authors: vec!["Grace Hopper".to_string()],
        paper_categories: categories.iter().map(|c| (*c).to_string()).collect(),
    }
}

async fn populate(db_path: &std::path::Path) -> (Vec<Chunk>, HashEmbedder) {
    let embedder = HashEmbedder::new(DIM);
    let chunks = vec![
        chunk("p1_0", "p1", "sparse retrieval with inverted indexes", &["cs.IR"]),
        chunk("p2_0", "p2", "dense retrieval with learned embeddings", &["cs.IR", "cs.CL"]),
        chunk("p3_0", "p3", "gradient descent convergence analysis", &["math.OC"]),
    ];
    let mut embeddings = Vec::new();
    for c in &chunks {
        embeddings.push(embedder.embed(&c.content).await.expect("embed"));
    }
    let writer = LanceChunkWriter::new(db_path, TABLE, DIM).await.expect("writer");
    let written = writer.index_chunks(&chunks, &embeddings).await.expect("index");
    assert_eq!(written, 3);
    (chunks, embedder)
}

#[tokio::test]
async fn nearest_chunk_ranks_first() {
    let tmp = TempDir::new().expect("tmp");
    let (_, embedder) = populate(tmp.path()).await;

    let index = LanceVectorIndex::new(tmp.path(), TABLE).await.expect("open");
    let query = embedder.embed("dense retrieval with learned embeddings").await.expect("embed");
    let results = index.search(&query, 3, None).await.expect("search");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].chunk.chunk_id, "p2_0");
    assert_eq!(results[0].rank, 1);
    // An exact-match query vector is at distance ~0 from its chunk.
    assert!(results[0].score > 0.99);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // Stored metadata survives the round trip.
    assert_eq!(results[0].chunk.paper_authors, vec!["Grace Hopper"]);
    assert_eq!(results[0].chunk.paper_categories, vec!["cs.IR", "cs.CL"]);
}

#[tokio::test]
async fn category_filter_is_applied() {
    let tmp = TempDir::new().expect("tmp");
    let (_, embedder) = populate(tmp.path()).await;

    let index = LanceVectorIndex::new(tmp.path(), TABLE).await.expect("open");
    let query = embedder.embed("retrieval").await.expect("embed");

    let cats = vec!["math.OC".to_string()];
    let results = index.search(&query, 3, Some(&cats)).await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.chunk_id, "p3_0");

    let cats = vec!["q-bio.NC".to_string()];
    let results = index.search(&query, 3, Some(&cats)).await.expect("search");
    assert!(results.is_empty());
}

#[tokio::test]
async fn top_k_truncates_results() {
    let tmp = TempDir::new().expect("tmp");
    let (_, embedder) = populate(tmp.path()).await;

    let index = LanceVectorIndex::new(tmp.path(), TABLE).await.expect("open");
    let query = embedder.embed("retrieval").await.expect("embed");
    let results = index.search(&query, 1, None).await.expect("search");
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn delete_paper_cascades_to_its_chunks() {
    let tmp = TempDir::new().expect("tmp");
    let (_, embedder) = populate(tmp.path()).await;

    let writer = LanceChunkWriter::new(tmp.path(), TABLE, DIM).await.expect("writer");
    writer.delete_paper("p2").await.expect("delete");

    let index = LanceVectorIndex::new(tmp.path(), TABLE).await.expect("open");
    let query = embedder.embed("dense retrieval with learned embeddings").await.expect("embed");
    let results = index.search(&query, 3, None).await.expect("search");
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.chunk.paper_id != "p2"));
}

#[tokio::test]
async fn dimension_mismatch_is_rejected() {
    let tmp = TempDir::new().expect("tmp");
    let writer = LanceChunkWriter::new(tmp.path(), TABLE, DIM).await.expect("writer");
    let chunks = vec![chunk("p1_0", "p1", "text", &["cs.IR"])];
    let bad = vec![vec![0.0f32; DIM + 1]];
    assert!(writer.index_chunks(&chunks, &bad).await.is_err());
}
