use anyhow::{ensure, Result};
use arrow_array::{
    FixedSizeListArray, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray,
};
use lancedb::{connect, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use paperdb_core::types::Chunk;

use crate::schema::chunk_table_schema;

/// Writes chunks and their embeddings into the LanceDB table. Embeddings
/// are computed upstream; the writer only checks that counts and
/// dimensions line up.
pub struct LanceChunkWriter {
    db: Connection,
    table_name: String,
    dim: i32,
}

impl LanceChunkWriter {
    pub async fn new(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let db = connect(db_path.to_string_lossy().as_ref()).execute().await?;
        Ok(Self { db, table_name: table_name.to_string(), dim: dim as i32 })
    }

    pub async fn index_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        ensure!(
            chunks.len() == embeddings.len(),
            "chunk/embedding count mismatch: {} vs {}",
            chunks.len(),
            embeddings.len()
        );
        for embedding in embeddings {
            ensure!(
                embedding.len() == self.dim as usize,
                "embedding dimension mismatch: expected {}, got {}",
                self.dim,
                embedding.len()
            );
        }
        let record_batch = self.to_record_batch(chunks, embeddings)?;
        let schema = record_batch.schema();
        let reader =
            Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if self.db.table_names().execute().await?.contains(&self.table_name) {
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        } else {
            self.db.create_table(&self.table_name, reader).execute().await?;
        }
        info!(count = chunks.len(), table = %self.table_name, "indexed chunks into lancedb");
        Ok(chunks.len())
    }

    /// Removes every chunk of the given paper (cascade on paper deletion).
    pub async fn delete_paper(&self, paper_id: &str) -> Result<()> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let escaped = paper_id.replace('\'', "''");
        table.delete(&format!("paper_id = '{escaped}'")).await?;
        info!(paper_id, "deleted paper chunks from lancedb");
        Ok(())
    }

    fn to_record_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<RecordBatch> {
        let schema = chunk_table_schema(self.dim);
        let mut chunk_ids = Vec::new();
        let mut paper_ids = Vec::new();
        let mut chunk_indices = Vec::new();
        let mut contents = Vec::new();
        let mut start_chars = Vec::new();
        let mut end_chars = Vec::new();
        let mut titles = Vec::new();
        let mut authors = Vec::new();
        let mut categories = Vec::new();
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            chunk_ids.push(chunk.chunk_id.clone());
            paper_ids.push(chunk.paper_id.clone());
            chunk_indices.push(chunk.chunk_index as i32);
            contents.push(chunk.content.clone());
            start_chars.push(chunk.start_char as i64);
            end_chars.push(chunk.end_char as i64);
            titles.push(chunk.paper_title.clone());
            authors.push(serde_json::to_string(&chunk.paper_authors)?);
            categories.push(serde_json::to_string(&chunk.paper_categories)?);
            vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
        }
        let record_batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(chunk_ids)),
                Arc::new(StringArray::from(paper_ids)),
                Arc::new(Int32Array::from(chunk_indices)),
                Arc::new(StringArray::from(contents)),
                Arc::new(Int64Array::from(start_chars)),
                Arc::new(Int64Array::from(end_chars)),
                Arc::new(StringArray::from(titles)),
                Arc::new(StringArray::from(authors)),
                Arc::new(StringArray::from(categories)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), self.dim)),
            ],
        )?;
        Ok(record_batch)
    }
}
