//! Domain types shared by the extractor, index and retriever.

use serde::{Deserialize, Serialize};

/// Position of a chunk in the corpus; also the row of its vector in the index.
pub type ChunkId = usize;

/// A retrievable unit of source text.
///
/// - `text`: non-empty, whitespace-trimmed payload
/// - `source`: path of the document it came from
/// - `page`: 1-based page number within `source`
///
/// The chunk id is implicit: its position in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: u32,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, page: u32) -> Self {
        Self { text: text.into(), source: source.into(), page }
    }
}

/// A chunk returned by retrieval, with its id and distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub id: ChunkId,
    pub distance: f32,
    pub chunk: Chunk,
}
