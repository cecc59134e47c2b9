use docqa_core::config::EmbeddingSettings;
use docqa_core::error::Error;
use docqa_embed::{get_default_embedder, DEFAULT_DIM};

fn fake_settings() -> EmbeddingSettings {
    EmbeddingSettings { use_fake: true, ..EmbeddingSettings::default() }
}

#[test]
fn fake_embedder_shapes_and_determinism() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");

    assert_eq!(embs.len(), 2);
    assert_eq!(embs[0].len(), DEFAULT_DIM);
    assert_eq!(embedder.dim(), DEFAULT_DIM);

    let norm: f32 = embs[0].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Bit-identical for identical input
    let a: Vec<u32> = embs[0].iter().map(|x| x.to_bits()).collect();
    let b: Vec<u32> = embs[1].iter().map(|x| x.to_bits()).collect();
    assert_eq!(a, b);
}

#[test]
fn empty_batch_yields_empty_result() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    assert!(embedder.embed_batch(&[]).expect("empty batch").is_empty());
}

#[test]
fn blank_query_fails_fast() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let err = embedder.embed_query("   ").unwrap_err();
    assert!(matches!(err, Error::Encoding(_)));
}

#[test]
fn query_vector_matches_batch_vector() {
    let embedder = get_default_embedder(&fake_settings()).expect("embedder");
    let q = embedder.embed_query("What is AI?").expect("query");
    let b = embedder.embed_batch(&["What is AI?".to_string()]).expect("batch").remove(0);
    assert_eq!(q, b);
}

/// Needs network access or `APP_EMBEDDING__MODEL_DIR` pointing at all-MiniLM-L6-v2:
/// `cargo test -p docqa-embed --test embed_tests -- --ignored`
#[ignore]
#[test]
fn bert_embedder_produces_normalized_384_dim_vectors() {
    let embedder = docqa_embed::BertEmbedder::load(&EmbeddingSettings::default()).expect("model");
    let texts = vec!["AI is great".to_string(), "ML is powerful.".to_string(), "AI is great".to_string()];
    let embs = docqa_core::traits::Embedder::embed_batch(&embedder, &texts).expect("embed");
    assert_eq!(embs.len(), 3);
    assert_eq!(embs[0].len(), 384);
    let norm: f32 = embs[1].iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3);
    assert_eq!(embs[0], embs[2]);
}
