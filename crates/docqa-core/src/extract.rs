//! Turns a folder of documents into the ordered chunk sequence of a corpus.
//!
//! Documents are visited in sorted path order, pages in document order, and
//! each page is split on the configured delimiter. Files that cannot be read
//! are skipped with a warning; the run carries on with the rest.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{ChunkingSettings, DataSettings};
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Plain-text documents use form feeds as page breaks.
const TEXT_PAGE_BREAK: char = '\x0c';

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub delimiter: String,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let chunking = ChunkingSettings::default();
        Self { delimiter: chunking.delimiter, extensions: chunking.extensions, recursive: false }
    }
}

impl ExtractorConfig {
    pub fn from_settings(chunking: &ChunkingSettings, data: &DataSettings) -> Self {
        Self {
            delimiter: chunking.delimiter.clone(),
            extensions: chunking.extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            recursive: data.recursive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub chunks: Vec<Chunk>,
    /// Documents that were read successfully, including those that yielded no text.
    pub documents: usize,
    pub skipped: Vec<SkippedDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct ChunkExtractor {
    config: ExtractorConfig,
}

impl ChunkExtractor {
    pub fn new(config: ExtractorConfig) -> Self { Self { config } }

    pub fn extract_dir(&self, folder: &Path) -> Result<ExtractionReport> {
        if !folder.is_dir() {
            return Err(Error::Extraction { path: folder.to_path_buf(), reason: "not a directory".to_string() });
        }
        let files = self.list_documents(folder);
        let mut report = ExtractionReport::default();
        if files.is_empty() {
            info!(folder = %folder.display(), "no recognized documents found");
            return Ok(report);
        }
        for (file_index, path) in files.iter().enumerate() {
            debug!("Processing file {}/{}: {}", file_index + 1, files.len(), path.display());
            match self.extract_file(path) {
                Ok(chunks) => {
                    report.documents += 1;
                    report.chunks.extend(chunks);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    report.skipped.push(SkippedDocument { path: path.clone(), reason: e.to_string() });
                }
            }
        }
        info!(
            documents = report.documents,
            skipped = report.skipped.len(),
            chunks = report.chunks.len(),
            "extraction finished"
        );
        Ok(report)
    }

    /// Chunks of a single document, in page order.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let kind = DocumentKind::from_path(path).ok_or_else(|| Error::Extraction {
            path: path.to_path_buf(),
            reason: "unrecognized document type".to_string(),
        })?;
        let pages = match kind {
            DocumentKind::Pdf => read_pdf_pages(path)?,
            DocumentKind::Text => read_text_pages(path)?,
        };
        let source = path.to_string_lossy().to_string();
        let mut chunks = Vec::new();
        for (page, text) in pages {
            chunks.extend(split_into_chunks(&text, &self.config.delimiter).map(|piece| Chunk::new(piece, source.clone(), page)));
        }
        Ok(chunks)
    }

    fn list_documents(&self, root: &Path) -> Vec<PathBuf> {
        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.is_recognized(p))
            .collect();
        files.sort();
        files
    }

    fn is_recognized(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else { return false };
        let ext = ext.to_ascii_lowercase();
        DocumentKind::from_path(path).is_some() && self.config.extensions.iter().any(|e| *e == ext)
    }
}

/// Split one page on `delimiter`, yielding trimmed non-empty pieces in order.
pub fn split_into_chunks<'a>(text: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    text.split(delimiter).map(str::trim).filter(|piece| !piece.is_empty())
}

fn read_pdf_pages(path: &Path) -> Result<Vec<(u32, String)>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::Extraction { path: path.to_path_buf(), reason: e.to_string() })?;
    let mut pages = Vec::new();
    for page_number in doc.get_pages().keys().copied() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => pages.push((page_number, text)),
            // A page without a decodable text layer contributes nothing.
            Err(e) => debug!(path = %path.display(), page = page_number, error = %e, "page has no extractable text"),
        }
    }
    Ok(pages)
}

fn read_text_pages(path: &Path) -> Result<Vec<(u32, String)>> {
    let bytes = fs::read(path).map_err(|e| Error::Extraction { path: path.to_path_buf(), reason: e.to_string() })?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    Ok(content.split(TEXT_PAGE_BREAK).zip(1u32..).map(|(text, page)| (page, text.to_string())).collect())
}
