//! On-disk form of an `IndexedCorpus`: two coupled artifacts under one root.
//!
//! - `index.bin`: bincode record with format version, model id, row count,
//!   dimension, the row-major vectors, and a blake3 checksum of the corpus
//! - `corpus.json`: the ordered chunk list and its count
//!
//! Loading checks both files exist, decode, agree on count, and that the corpus
//! hashes to the checksum recorded in the index. Any failure is a
//! `MissingArtifact` error; a partial or empty corpus is never returned.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use docqa_core::error::{Error, Result};
use docqa_core::types::Chunk;

use crate::corpus::IndexedCorpus;
use crate::index::FlatL2Index;

pub const INDEX_FILE: &str = "index.bin";
pub const CORPUS_FILE: &str = "corpus.json";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct IndexArtifact {
    format_version: u32,
    model_id: String,
    count: usize,
    dim: usize,
    corpus_checksum: String,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct CorpusArtifact {
    count: usize,
    chunks: Vec<Chunk>,
}

fn corpus_checksum(chunks: &[Chunk]) -> Result<String> {
    let bytes = serde_json::to_vec(chunks).map_err(|e| Error::Io(e.into()))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn missing(path: &Path, reason: impl std::fmt::Display) -> Error {
    Error::MissingArtifact(format!("{}: {}", path.display(), reason))
}

pub struct CorpusStore {
    root: PathBuf,
}

impl CorpusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }
    pub fn index_path(&self) -> PathBuf { self.root.join(INDEX_FILE) }
    pub fn corpus_path(&self) -> PathBuf { self.root.join(CORPUS_FILE) }

    /// Both artifacts are present (not necessarily valid).
    pub fn exists(&self) -> bool { self.index_path().is_file() && self.corpus_path().is_file() }

    /// Write both artifacts, each via temp file + rename. The index goes last so
    /// a crash mid-save leaves a checksum mismatch rather than a silent pairing.
    pub fn save(&self, corpus: &IndexedCorpus) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let checksum = corpus_checksum(corpus.chunks())?;

        let corpus_artifact = CorpusArtifact { count: corpus.len(), chunks: corpus.chunks().to_vec() };
        self.write_atomic(&self.corpus_path(), |w| {
            serde_json::to_writer(w, &corpus_artifact).map_err(|e| Error::Io(e.into()))
        })?;

        let index_artifact = IndexArtifact {
            format_version: FORMAT_VERSION,
            model_id: corpus.model_id().to_string(),
            count: corpus.len(),
            dim: corpus.dim(),
            corpus_checksum: checksum,
            data: corpus.index().as_slice().to_vec(),
        };
        self.write_atomic(&self.index_path(), |w| {
            bincode::serialize_into(w, &index_artifact).map_err(|e| Error::Io(std::io::Error::other(e)))
        })?;
        info!(root = %self.root.display(), chunks = corpus.len(), dim = corpus.dim(), "store saved");
        Ok(())
    }

    pub fn load(&self) -> Result<IndexedCorpus> {
        let index_path = self.index_path();
        let corpus_path = self.corpus_path();

        let index_file = fs::File::open(&index_path).map_err(|e| missing(&index_path, e))?;
        let corpus_file = fs::File::open(&corpus_path).map_err(|e| missing(&corpus_path, e))?;

        let index_artifact: IndexArtifact =
            bincode::deserialize_from(BufReader::new(index_file)).map_err(|e| missing(&index_path, e))?;
        if index_artifact.format_version != FORMAT_VERSION {
            return Err(missing(&index_path, format!("unsupported format version {}", index_artifact.format_version)));
        }
        let corpus_artifact: CorpusArtifact =
            serde_json::from_reader(BufReader::new(corpus_file)).map_err(|e| missing(&corpus_path, e))?;

        if corpus_artifact.count != corpus_artifact.chunks.len() {
            return Err(missing(
                &corpus_path,
                format!("declares {} chunks but holds {}", corpus_artifact.count, corpus_artifact.chunks.len()),
            ));
        }
        if corpus_artifact.count != index_artifact.count {
            return Err(missing(
                &corpus_path,
                format!("holds {} chunks but the index holds {} vectors", corpus_artifact.count, index_artifact.count),
            ));
        }
        if corpus_checksum(&corpus_artifact.chunks)? != index_artifact.corpus_checksum {
            return Err(missing(&corpus_path, "checksum does not match the one recorded in the index"));
        }

        let index = FlatL2Index::from_parts(index_artifact.dim, index_artifact.data).map_err(|e| missing(&index_path, e))?;
        if index.len() != index_artifact.count {
            return Err(missing(
                &index_path,
                format!("declares {} vectors but holds {}", index_artifact.count, index.len()),
            ));
        }
        let corpus = IndexedCorpus::new(index, corpus_artifact.chunks, index_artifact.model_id)?;
        info!(root = %self.root.display(), chunks = corpus.len(), "store loaded");
        Ok(corpus)
    }

    fn write_atomic<F>(&self, target: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<&mut NamedTempFile>) -> Result<()>,
    {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            write(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_index_is_reported_as_missing_artifact() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = CorpusStore::new(tmp.path());
        let corpus = CorpusArtifact { count: 0, chunks: Vec::new() };
        fs::write(store.corpus_path(), serde_json::to_vec(&corpus).unwrap()).unwrap();
        let index = IndexArtifact {
            format_version: FORMAT_VERSION,
            model_id: "m".to_string(),
            count: 0,
            dim: 0,
            corpus_checksum: corpus_checksum(&[]).unwrap(),
            data: Vec::new(),
        };
        fs::write(store.index_path(), bincode::serialize(&index).unwrap()).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(ref msg) if msg.contains("dimension")), "got {err:?}");
    }
}
