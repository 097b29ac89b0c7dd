use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use paperdb_core::config::Settings;
use paperdb_core::traits::EmbeddingProvider;
use paperdb_core::types::Chunk;
use paperdb_embed::HashEmbedder;
use paperdb_text::ChunkIndexWriter;
use paperdb_vector::LanceChunkWriter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <chunks_dir>", args[0]);
        eprintln!("  <chunks_dir>: directory of .jsonl files, one chunk record per line");
        std::process::exit(1);
    }
    let chunks_dir = PathBuf::from(&args[1]);
    let settings = Settings::load()?;

    let mut chunks: Vec<Chunk> = Vec::new();
    for entry in WalkDir::new(&chunks_dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "jsonl")
        {
            let content = std::fs::read_to_string(entry.path())
                .with_context(|| format!("read {}", entry.path().display()))?;
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let chunk: Chunk = serde_json::from_str(line)
                    .with_context(|| format!("parse {}:{}", entry.path().display(), line_no + 1))?;
                chunks.push(chunk);
            }
        }
    }
    println!("Loaded {} chunks from {}", chunks.len(), chunks_dir.display());
    if chunks.is_empty() {
        return Ok(());
    }

    let embedder = HashEmbedder::new(settings.index.embedding_dim);
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)",
            )?
            .progress_chars("#>-"),
    );
    let mut embeddings = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        embeddings.push(embedder.embed(&chunk.content).await?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let lexical_dir = settings.index.lexical_index_dir();
    let writer = ChunkIndexWriter::new(&lexical_dir)?;
    let count = writer.index_chunks(&chunks)?;
    println!("Indexed {} chunks into tantivy at {}", count, lexical_dir.display());

    let vector_dir = settings.index.vector_index_dir();
    let writer = LanceChunkWriter::new(
        &vector_dir,
        &settings.index.vector_table,
        settings.index.embedding_dim,
    )
    .await?;
    let count = writer.index_chunks(&chunks, &embeddings).await?;
    println!("Indexed {} chunks into lancedb at {}", count, vector_dir.display());
    Ok(())
}
