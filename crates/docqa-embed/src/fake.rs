use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use docqa_core::error::Result;
use docqa_core::traits::Embedder;

/// Hashing bag-of-words embedder for tests and offline development.
///
/// Tokens are lowercased and stripped of punctuation, each hashed into one of
/// `dim` buckets with unit weight; the result is L2-normalized. Texts sharing
/// more words land closer together.
pub struct FakeEmbedder {
    dim: usize,
    id: String,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("fake:xxhash64:d{}", dim) } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token: String = token.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let idx = (hasher.finish() % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn model_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
