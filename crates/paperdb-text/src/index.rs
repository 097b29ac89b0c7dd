use anyhow::Result;
use std::path::Path;
use tantivy::schema::Field;
use tantivy::{Index, TantivyDocument, Term};
use tracing::info;

use paperdb_core::types::Chunk;

use crate::schema::{build_schema, register_tokenizer};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Writes paper chunks into the tantivy index. Creating a writer wipes any
/// existing index at `index_dir`; reindexing is a full rebuild.
pub struct ChunkIndexWriter {
    index: Index,
    chunk_id_field: Field,
    paper_id_field: Field,
    chunk_index_field: Field,
    start_char_field: Field,
    end_char_field: Field,
    content_field: Field,
    title_field: Field,
    authors_field: Field,
    categories_field: Field,
}

impl ChunkIndexWriter {
    pub fn new(index_dir: &Path) -> Result<Self> {
        let schema = build_schema();
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir)?;
        }
        std::fs::create_dir_all(index_dir)?;
        let index = Index::create_in_dir(index_dir, schema.clone())?;
        register_tokenizer(&index);
        Ok(Self {
            chunk_id_field: schema.get_field("chunk_id")?,
            paper_id_field: schema.get_field("paper_id")?,
            chunk_index_field: schema.get_field("chunk_index")?,
            start_char_field: schema.get_field("start_char")?,
            end_char_field: schema.get_field("end_char")?,
            content_field: schema.get_field("content")?,
            title_field: schema.get_field("paper_title")?,
            authors_field: schema.get_field("paper_authors")?,
            categories_field: schema.get_field("paper_categories")?,
            index,
        })
    }

    pub fn index_chunks(&self, chunks: &[Chunk]) -> Result<usize> {
        let mut index_writer = self.index.writer(WRITER_HEAP_BYTES)?;
        for chunk in chunks {
            let mut doc = TantivyDocument::default();
            doc.add_text(self.chunk_id_field, &chunk.chunk_id);
            doc.add_text(self.paper_id_field, &chunk.paper_id);
            doc.add_u64(self.chunk_index_field, chunk.chunk_index as u64);
            doc.add_u64(self.start_char_field, chunk.start_char as u64);
            doc.add_u64(self.end_char_field, chunk.end_char as u64);
            doc.add_text(self.content_field, &chunk.content);
            doc.add_text(self.title_field, &chunk.paper_title);
            doc.add_text(self.authors_field, serde_json::to_string(&chunk.paper_authors)?);
            for category in &chunk.paper_categories {
                doc.add_text(self.categories_field, category);
            }
            index_writer.add_document(doc)?;
        }
        index_writer.commit()?;
        info!(count = chunks.len(), "indexed chunks into tantivy");
        Ok(chunks.len())
    }

    /// Removes every chunk of the given paper (cascade on paper deletion).
    pub fn delete_paper(&self, paper_id: &str) -> Result<()> {
        let mut index_writer = self.index.writer::<TantivyDocument>(WRITER_HEAP_BYTES)?;
        index_writer.delete_term(Term::from_field_text(self.paper_id_field, paper_id));
        index_writer.commit()?;
        info!(paper_id, "deleted paper chunks from tantivy");
        Ok(())
    }
}
