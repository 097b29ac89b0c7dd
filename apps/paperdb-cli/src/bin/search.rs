use std::env;
use std::sync::Arc;

use anyhow::Result;

use paperdb_core::config::Settings;
use paperdb_embed::HashEmbedder;
use paperdb_hybrid::{HybridRetriever, SearchOptions};
use paperdb_text::TantivyLexicalIndex;
use paperdb_vector::LanceVectorIndex;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [top_k] [category ...]", args[0]);
        eprintln!("Example: {} 'reciprocal rank fusion' 5 cs.IR", args[0]);
        std::process::exit(1);
    }
    let query = &args[1];
    let top_k: usize = args.get(2).map_or(Ok(10), |s| s.parse())?;
    let categories: Vec<String> = args.iter().skip(3).cloned().collect();

    let settings = Settings::load()?;
    let lexical = TantivyLexicalIndex::open(&settings.index.lexical_index_dir())?;
    let vector = LanceVectorIndex::new(
        &settings.index.vector_index_dir(),
        &settings.index.vector_table,
    )
    .await?;
    let embedder = HashEmbedder::new(settings.index.embedding_dim);
    let retriever = HybridRetriever::new(
        Arc::new(embedder),
        Arc::new(vector),
        Arc::new(lexical),
        settings.retrieval.clone(),
    );

    let opts = SearchOptions {
        categories: if categories.is_empty() { None } else { Some(categories) },
        ..Default::default()
    };
    let results = retriever.search_with(query, top_k, &opts).await?;

    println!("Found {} results for: \"{}\"", results.len(), query);
    for result in &results {
        let snippet: String = result.chunk.content.chars().take(120).collect();
        println!(
            "\n  {}. score={:.6}  chunk={}  paper={}",
            result.rank, result.score, result.chunk.chunk_id, result.chunk.paper_id
        );
        println!("     {} — {}", result.chunk.paper_title, result.chunk.paper_categories.join(", "));
        println!("     {}", snippet);
    }
    Ok(())
}
