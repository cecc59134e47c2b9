use std::fs;
use tempfile::TempDir;

use docqa_core::config::{AppConfig, Config};
use docqa_core::error::Error;
use docqa_core::extract::{ChunkExtractor, ExtractorConfig};

#[test]
fn extract_dir_single_document_two_chunks() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "AI is great. ML is powerful.").unwrap();

    let extractor = ChunkExtractor::default();
    let report = extractor.extract_dir(dir).expect("extract");

    let texts: Vec<&str> = report.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["AI is great", "ML is powerful."]);
    assert_eq!(report.documents, 1);
    assert!(report.skipped.is_empty());
}

#[test]
fn extract_dir_preserves_document_and_page_order() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("b.txt"), "b one. b two").unwrap();
    fs::write(dir.join("a.txt"), "a page one\x0ca page two").unwrap();

    let report = ChunkExtractor::default().extract_dir(dir).expect("extract");

    let got: Vec<(&str, u32)> = report.chunks.iter().map(|c| (c.text.as_str(), c.page)).collect();
    assert_eq!(got, vec![("a page one", 1), ("a page two", 2), ("b one", 1), ("b two", 1)]);
    assert!(report.chunks[0].source.ends_with("a.txt"));
}

#[test]
fn unreadable_document_is_skipped_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("broken.pdf"), b"this is not a pdf").unwrap();
    fs::write(dir.join("good.txt"), "Still indexed").unwrap();

    let report = ChunkExtractor::default().extract_dir(dir).expect("extract");

    assert_eq!(report.skipped.len(), 1, "broken pdf recorded as skipped");
    assert!(report.skipped[0].path.ends_with("broken.pdf"));
    assert_eq!(report.chunks.len(), 1);
    assert_eq!(report.chunks[0].text, "Still indexed");
}

#[test]
fn empty_document_contributes_zero_chunks() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("blank.txt"), "   \n  ").unwrap();

    let report = ChunkExtractor::default().extract_dir(tmp.path()).expect("extract");

    assert!(report.chunks.is_empty());
    assert_eq!(report.documents, 1);
    assert!(report.skipped.is_empty());
}

#[test]
fn unrecognized_extensions_and_subdirectories_are_ignored_by_default() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("notes.md"), "ignored. entirely").unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("nested/deep.txt"), "deep text").unwrap();

    let flat = ChunkExtractor::default().extract_dir(dir).expect("extract");
    assert!(flat.chunks.is_empty());

    let recursive = ChunkExtractor::new(ExtractorConfig { recursive: true, ..ExtractorConfig::default() });
    let report = recursive.extract_dir(dir).expect("extract");
    assert_eq!(report.chunks.len(), 1);
    assert_eq!(report.chunks[0].text, "deep text");
}

#[test]
fn missing_folder_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = ChunkExtractor::default().extract_dir(&tmp.path().join("nope")).unwrap_err();
    assert!(matches!(err, Error::Extraction { .. }));
}

#[test]
fn settings_default_match_reference_pipeline() {
    let settings = Config::from_figment(figment::Figment::from(figment::providers::Serialized::defaults(AppConfig::default())))
        .settings()
        .expect("defaults are valid");
    assert_eq!(settings.retrieval.top_k, 3);
    assert_eq!(settings.chunking.delimiter, ". ");
    assert_eq!(settings.generation.max_tokens, 200);
    assert_eq!(settings.embedding.model_id, "sentence-transformers/all-MiniLM-L6-v2");
}

#[test]
fn settings_reject_zero_top_k() {
    let figment = figment::Figment::from(figment::providers::Serialized::defaults(AppConfig::default()))
        .merge(("retrieval.top_k", 0));
    let err = Config::from_figment(figment).settings().unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn get_reads_nested_keys() {
    let figment = figment::Figment::from(figment::providers::Serialized::defaults(AppConfig::default()))
        .merge(("data.store_dir", "/srv/store"));
    let config = Config::from_figment(figment);
    let dir: String = config.get("data.store_dir").expect("key present");
    assert_eq!(dir, "/srv/store");
}

#[test]
fn resolve_with_base_keeps_absolute_paths() {
    let base = std::path::Path::new("/base");
    assert_eq!(docqa_core::config::resolve_with_base(base, "rel/dir"), base.join("rel/dir"));
    assert_eq!(docqa_core::config::resolve_with_base(base, "/abs"), std::path::PathBuf::from("/abs"));
}
