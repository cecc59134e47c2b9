use crate::error::{Error, Result};

/// Maps text to fixed-width vectors with one model loaded for the life of the value.
///
/// Build time and query time must use the same embedder so stored and query
/// vectors share a space.
pub trait Embedder: Send + Sync {
    /// Stable identifier of the loaded model, recorded alongside the index.
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    /// One vector per input, same order. Empty input yields an empty result.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        if query.trim().is_empty() {
            return Err(Error::Encoding("query text is empty".to_string()));
        }
        self.embed_batch(&[query.to_string()])?
            .pop()
            .ok_or_else(|| Error::Encoding("embedder returned no vector for query".to_string()))
    }
}
