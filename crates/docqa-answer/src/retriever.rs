use std::sync::Arc;

use tracing::{debug, warn};

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::RetrievedChunk;
use docqa_vector::{CorpusStore, IndexedCorpus};

/// Query-time half of the pipeline: embed the question, scan the index, map
/// hits back to chunk texts.
///
/// The corpus is loaded once and shared read-only; concurrent `retrieve`
/// calls need no locking.
#[derive(Clone)]
pub struct Retriever {
    corpus: Arc<IndexedCorpus>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Fails with `DimensionMismatch` when the embedder does not produce vectors
    /// of the width the index was built with.
    pub fn new(corpus: Arc<IndexedCorpus>, embedder: Arc<dyn Embedder>, top_k: usize) -> Result<Self> {
        if top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        if embedder.dim() != corpus.dim() {
            return Err(Error::DimensionMismatch { expected: corpus.dim(), actual: embedder.dim() });
        }
        if corpus.model_id() != embedder.model_id() {
            warn!(
                index_model = corpus.model_id(),
                query_model = embedder.model_id(),
                "query embedder differs from the one the index was built with"
            );
        }
        Ok(Self { corpus, embedder, top_k })
    }

    pub fn open(store: &CorpusStore, embedder: Arc<dyn Embedder>, top_k: usize) -> Result<Self> {
        let corpus = store.load()?;
        Self::new(Arc::new(corpus), embedder, top_k)
    }

    pub fn top_k(&self) -> usize { self.top_k }

    pub fn corpus(&self) -> &IndexedCorpus { &self.corpus }

    /// Up to `top_k` chunk texts, nearest first.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        Ok(self.retrieve_hits(query, top_k)?.into_iter().map(|hit| hit.chunk.text).collect())
    }

    pub fn retrieve_hits(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        if self.corpus.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed_query(query)?;
        let result = self.corpus.index().search(&vector, top_k)?;
        let hits = self.corpus.resolve(&result);
        debug!(top_k, hits = hits.len(), "retrieved context");
        Ok(hits)
    }
}
