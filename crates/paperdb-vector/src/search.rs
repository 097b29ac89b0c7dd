use anyhow::{Context, Result};
use arrow_array::{Float32Array, Int32Array, Int64Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::path::Path;
use tracing::debug;

use paperdb_core::traits::VectorIndex;
use paperdb_core::types::{Chunk, RankedResult, RetrievalSource};

/// Candidates fetched per requested result. Category filtering happens
/// client-side after the scan, so the fetch is padded to keep recall up
/// when a filter drops most of the neighborhood.
const OVERSCAN_FACTOR: usize = 10;

pub struct LanceVectorIndex {
    db: Connection,
    table_name: String,
}

impl LanceVectorIndex {
    pub async fn new(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    fn batch_to_results(
        batch: &RecordBatch,
        categories: Option<&[String]>,
        out: &mut Vec<RankedResult>,
    ) -> Result<()> {
        let string_column = |name: &str| -> Result<&StringArray> {
            batch
                .column_by_name(name)
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .with_context(|| format!("missing column: {name}"))
        };
        let chunk_ids = string_column("chunk_id")?;
        let paper_ids = string_column("paper_id")?;
        let contents = string_column("content")?;
        let titles = string_column("paper_title")?;
        let authors = string_column("paper_authors")?;
        let category_lists = string_column("paper_categories")?;
        let chunk_indices = batch
            .column_by_name("chunk_index")
            .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
            .context("missing column: chunk_index")?;
        let start_chars = batch
            .column_by_name("start_char")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .context("missing column: start_char")?;
        let end_chars = batch
            .column_by_name("end_char")
            .and_then(|c| c.as_any().downcast_ref::<Int64Array>())
            .context("missing column: end_char")?;

        for i in 0..batch.num_rows() {
            // Cosine-space distance comes back as `_distance`; similarity is its complement.
            let score = if let Some(distance_col) = batch.column_by_name("_distance") {
                1.0 - distance_col
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .context("_distance column type")?
                    .value(i)
            } else if let Some(score_col) = batch.column_by_name("_score") {
                score_col
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .context("_score column type")?
                    .value(i)
            } else {
                0.5
            };
            let chunk = Chunk {
                chunk_id: chunk_ids.value(i).to_string(),
                paper_id: paper_ids.value(i).to_string(),
                chunk_index: chunk_indices.value(i) as usize,
                content: contents.value(i).to_string(),
                start_char: start_chars.value(i) as usize,
                end_char: end_chars.value(i) as usize,
                embedding: None,
                paper_title: titles.value(i).to_string(),
                paper_authors: serde_json::from_str(authors.value(i)).unwrap_or_default(),
                paper_categories: serde_json::from_str(category_lists.value(i))
                    .unwrap_or_default(),
            };
            if let Some(cats) = categories {
                if !chunk.in_categories(cats) {
                    continue;
                }
            }
            out.push(RankedResult {
                score,
                rank: out.len() + 1,
                source: RetrievalSource::Vector,
                chunk,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    async fn search(
        &self,
        query_vec: &[f32],
        top_k: usize,
        categories: Option<&[String]>,
    ) -> Result<Vec<RankedResult>> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let fetch_limit = top_k.saturating_mul(OVERSCAN_FACTOR);
        let mut stream =
            table.vector_search(query_vec.to_vec())?.limit(fetch_limit).execute().await?;
        let mut results = Vec::new();
        while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
            Self::batch_to_results(&batch, categories, &mut results)?;
            if results.len() >= top_k {
                break;
            }
        }
        results.truncate(top_k);
        debug!(hits = results.len(), table = %self.table_name, "vector search");
        Ok(results)
    }
}
