use docqa_core::error::{Error, Result};
use docqa_core::types::{Chunk, ChunkId, RetrievedChunk};

use crate::index::{FlatL2Index, SearchResult};

/// The vector index and the chunk texts it was built from, as one unit.
///
/// Row `i` of the index is the embedding of `chunks[i]`; every constructor
/// checks that both sides have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCorpus {
    index: FlatL2Index,
    chunks: Vec<Chunk>,
    model_id: String,
}

impl IndexedCorpus {
    pub fn new(index: FlatL2Index, chunks: Vec<Chunk>, model_id: impl Into<String>) -> Result<Self> {
        if index.len() != chunks.len() {
            return Err(Error::ParityMismatch { chunks: chunks.len(), vectors: index.len() });
        }
        Ok(Self { index, chunks, model_id: model_id.into() })
    }

    /// Pair chunks with their embeddings, in order.
    pub fn build(chunks: Vec<Chunk>, embeddings: &[Vec<f32>], dim: usize, model_id: impl Into<String>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::ParityMismatch { chunks: chunks.len(), vectors: embeddings.len() });
        }
        let mut index = FlatL2Index::new(dim)?;
        index.add(embeddings)?;
        Self::new(index, chunks, model_id)
    }

    pub fn len(&self) -> usize { self.chunks.len() }
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }
    pub fn dim(&self) -> usize { self.index.dim() }
    pub fn model_id(&self) -> &str { &self.model_id }
    pub fn index(&self) -> &FlatL2Index { &self.index }
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> { self.chunks.get(id) }

    /// Map search hits to chunks, dropping sentinels and ids past the end of the corpus.
    pub fn resolve(&self, result: &SearchResult) -> Vec<RetrievedChunk> {
        result
            .valid()
            .filter_map(|(id, distance)| self.chunk(id).map(|chunk| RetrievedChunk { id, distance, chunk: chunk.clone() }))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk { Chunk::new(text, "doc.pdf", 1) }

    #[test]
    fn build_rejects_length_mismatch() {
        let err = IndexedCorpus::build(vec![chunk("a"), chunk("b")], &[vec![0.0, 1.0]], 2, "m").unwrap_err();
        assert!(matches!(err, Error::ParityMismatch { chunks: 2, vectors: 1 }));
    }

    #[test]
    fn resolve_filters_sentinels() {
        let corpus = IndexedCorpus::build(vec![chunk("a"), chunk("b")], &[vec![0.0, 0.0], vec![1.0, 1.0]], 2, "m").unwrap();
        let result = corpus.index().search(&[1.0, 1.0], 4).unwrap();
        let hits = corpus.resolve(&result);
        let texts: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"]);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn empty_corpus_is_valid() {
        let corpus = IndexedCorpus::build(Vec::new(), &[], 3, "m").unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.dim(), 3);
    }
}
