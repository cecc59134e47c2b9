//! Build-time pipeline: extract → embed → index → save.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docqa_core::error::{Error, Result};
use docqa_core::extract::{ChunkExtractor, SkippedDocument};
use docqa_core::traits::Embedder;
use docqa_core::types::Chunk;

use crate::corpus::IndexedCorpus;
use crate::store::CorpusStore;

#[derive(Debug)]
pub struct IngestReport {
    pub documents: usize,
    pub skipped: Vec<SkippedDocument>,
    pub chunks: usize,
    pub dim: usize,
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Embed `chunks` in batches and pair them with their vectors in order.
pub fn build_corpus(chunks: Vec<Chunk>, embedder: &dyn Embedder, batch_size: usize) -> Result<IndexedCorpus> {
    let batch_size = batch_size.max(1);
    let pb = progress_bar(chunks.len());
    let mut embeddings = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != texts.len() {
            return Err(Error::Encoding(format!("embedder returned {} vectors for {} texts", vectors.len(), texts.len())));
        }
        embeddings.extend(vectors);
        pb.inc(batch.len() as u64);
        debug!(done = embeddings.len(), total = chunks.len(), "embedded batch");
    }
    pb.finish_with_message("embedding complete");
    IndexedCorpus::build(chunks, &embeddings, embedder.dim(), embedder.model_id())
}

/// Rebuild the store at `store` from every document in `docs_dir`.
pub fn ingest(
    extractor: &ChunkExtractor,
    embedder: &dyn Embedder,
    docs_dir: &Path,
    store: &CorpusStore,
    batch_size: usize,
) -> Result<IngestReport> {
    info!(docs_dir = %docs_dir.display(), store = %store.root().display(), "ingestion started");
    let extraction = extractor.extract_dir(docs_dir)?;
    let corpus = build_corpus(extraction.chunks, embedder, batch_size)?;
    store.save(&corpus)?;
    info!(chunks = corpus.len(), documents = extraction.documents, "ingestion finished");
    Ok(IngestReport {
        documents: extraction.documents,
        skipped: extraction.skipped,
        chunks: corpus.len(),
        dim: corpus.dim(),
    })
}
