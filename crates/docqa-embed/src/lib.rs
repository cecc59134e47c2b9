//! Sentence embeddings with candle.
//!
//! `BertEmbedder` runs a BERT-family sentence-transformers model
//! (all-MiniLM-L6-v2 by default): batched forward pass, mean pooling over the
//! attention mask, L2 normalisation. `FakeEmbedder` is a deterministic stand-in
//! selected by `embedding.use_fake` or `APP_USE_FAKE_EMBEDDINGS=1`.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

use anyhow::{Result, anyhow};
use std::time::Instant;
use tracing::{debug, info};

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use docqa_core::config::EmbeddingSettings;
use docqa_core::error::Error;
use docqa_core::traits::Embedder;

pub mod device;
pub mod fake;
pub mod model;
pub mod pool;
pub mod tokenize;

pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;

/// Width of all-MiniLM-L6-v2 vectors; the fake embedder matches it.
pub const DEFAULT_DIM: usize = 384;

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    batch_size: usize,
    model_id: String,
}

impl BertEmbedder {
    pub fn load(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let files = model::resolve_model_files(settings)?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;
        tokenize::configure(&mut tokenizer, settings.max_len)?;

        let config: BertConfig = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let dtype = DType::F32;
        let vb = if files.is_safetensors() {
            // SAFETY: the weights file is not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], dtype, &device)? }
        } else {
            let weights = candle_core::pickle::read_all(&files.weights)?;
            VarBuilder::from_tensors(weights.into_iter().collect(), dtype, &device)
        };
        let model = BertModel::load(vb, &config)?;
        info!(model_id = %settings.model_id, dim = config.hidden_size, "embedding model loaded");
        Ok(Self {
            model,
            tokenizer,
            device,
            dim: config.hidden_size,
            batch_size: settings.batch_size.max(1),
            model_id: settings.model_id.clone(),
        })
    }

    fn forward_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) = tokenize::tokenize_batch(&self.tokenizer, texts, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()?;
        Ok(vectors)
    }
}

impl Embedder for BertEmbedder {
    fn model_id(&self) -> &str { &self.model_id }
    fn dim(&self) -> usize { self.dim }

    fn embed_batch(&self, texts: &[String]) -> docqa_core::Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.forward_batch(batch).map_err(|e| Error::Encoding(e.to_string()))?;
            out.extend(vectors);
        }
        debug!(count = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "embedded batch");
        Ok(out)
    }
}

pub fn fake_requested(settings: &EmbeddingSettings) -> bool {
    settings.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        info!("Using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(DEFAULT_DIM)));
    }
    Ok(Box::new(BertEmbedder::load(settings)?))
}
