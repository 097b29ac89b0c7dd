//! Schema and analyzer for the chunk index.

use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const CHUNK_TOKENIZER: &str = "chunk_text";

/// All chunk fields are stored so a hit can be rebuilt without a second
/// lookup. `content` and `paper_title` are the searchable fields;
/// `paper_categories` is raw-indexed (one value per category) for exact
/// term filtering; `paper_authors` is display-only.
pub fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("chunk_id", STRING | STORED);
    schema_builder.add_text_field("paper_id", STRING | STORED);
    schema_builder.add_u64_field("chunk_index", STORED);
    schema_builder.add_u64_field("start_char", STORED);
    schema_builder.add_u64_field("end_char", STORED);
    let text_field_indexing = TextFieldIndexing::default()
        .set_tokenizer(CHUNK_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let text_options = TextOptions::default()
        .set_indexing_options(text_field_indexing)
        .set_stored();
    schema_builder.add_text_field("content", text_options.clone());
    schema_builder.add_text_field("paper_title", text_options);
    schema_builder.add_text_field("paper_authors", TextOptions::default().set_stored());
    schema_builder.add_text_field("paper_categories", STRING | STORED);
    schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
    let stop_words = vec![
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not",
        "this", "these", "they", "them", "their", "there", "then", "than", "so", "if", "when",
        "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could", "should",
        "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having",
    ];
    let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
        .build();
    index.tokenizers().register(CHUNK_TOKENIZER, tokenizer);
}
