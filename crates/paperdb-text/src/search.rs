use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{Index, TantivyDocument, Term};
use tracing::debug;

use paperdb_core::traits::LexicalIndex;
use paperdb_core::types::{Chunk, RankedResult, RetrievalSource};

use crate::schema::register_tokenizer;

/// BM25 search over the chunk index. Content is boosted over the title,
/// mirroring how much of a paper's relevance lives in its body text.
const CONTENT_BOOST: f32 = 2.0;
const TITLE_BOOST: f32 = 1.5;

pub struct TantivyLexicalIndex {
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

impl TantivyLexicalIndex {
    pub fn open(index_dir: &Path) -> Result<Self> {
        let index = Index::open_in_dir(index_dir)
            .with_context(|| format!("open tantivy index at {}", index_dir.display()))?;
        register_tokenizer(&index);
        let schema = index.schema();
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

    fn build_query(&self, query_text: &str, categories: Option<&[String]>) -> Result<Box<dyn Query>> {
        let mut query_parser =
            QueryParser::for_index(&self.index, vec![self.content_field, self.title_field]);
        query_parser.set_field_boost(self.content_field, CONTENT_BOOST);
        query_parser.set_field_boost(self.title_field, TITLE_BOOST);
        let user_query = query_parser.parse_query(query_text)?;
        match categories {
            Some(cats) if !cats.is_empty() => {
                // A paper matches when it carries at least one requested category.
                let category_clauses: Vec<(Occur, Box<dyn Query>)> = cats
                    .iter()
                    .map(|cat| {
                        let term = Term::from_field_text(self.categories_field, cat);
                        (
                            Occur::Should,
                            Box::new(TermQuery::new(term, IndexRecordOption::Basic))
                                as Box<dyn Query>,
                        )
                    })
                    .collect();
                let category_filter = BooleanQuery::new(category_clauses);
                Ok(Box::new(BooleanQuery::new(vec![
                    (Occur::Must, user_query),
                    (Occur::Must, Box::new(category_filter)),
                ])))
            }
            _ => Ok(user_query),
        }
    }

    fn doc_to_chunk(&self, doc: &TantivyDocument) -> Chunk {
        let text = |field: Field| {
            doc.get_first(field).and_then(|v| v.as_str()).unwrap_or_default().to_string()
        };
        let number =
            |field: Field| doc.get_first(field).and_then(|v| v.as_u64()).unwrap_or_default();
        let authors: Vec<String> =
            serde_json::from_str(&text(self.authors_field)).unwrap_or_default();
        let categories: Vec<String> = doc
            .get_all(self.categories_field)
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
        Chunk {
            chunk_id: text(self.chunk_id_field),
            paper_id: text(self.paper_id_field),
            chunk_index: number(self.chunk_index_field) as usize,
            content: text(self.content_field),
            start_char: number(self.start_char_field) as usize,
            end_char: number(self.end_char_field) as usize,
            embedding: None,
            paper_title: text(self.title_field),
            paper_authors: authors,
            paper_categories: categories,
        }
    }
}

#[async_trait]
impl LexicalIndex for TantivyLexicalIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        categories: Option<&[String]>,
    ) -> Result<Vec<RankedResult>> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let full_query = self.build_query(query, categories)?;
        let top_docs = searcher.search(&full_query, &TopDocs::with_limit(top_k))?;
        let mut results = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            results.push(RankedResult {
                chunk: self.doc_to_chunk(&doc),
                score,
                rank: results.len() + 1,
                source: RetrievalSource::Keyword,
            });
        }
        debug!(query, hits = results.len(), "lexical search");
        Ok(results)
    }
}
