//! Arrow schema for the chunk table.
//!
//! Author and category lists round-trip through JSON-encoded string
//! columns; the embedding is a fixed-size float list whose length is set
//! per deployment.

use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub fn chunk_table_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("chunk_id", DataType::Utf8, false),
        Field::new("paper_id", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("start_char", DataType::Int64, false),
        Field::new("end_char", DataType::Int64, false),
        Field::new("paper_title", DataType::Utf8, false),
        Field::new("paper_authors", DataType::Utf8, false),
        Field::new("paper_categories", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
