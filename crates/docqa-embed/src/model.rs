//! Locating the embedding model files: a configured local directory, or the
//! Hugging Face Hub cache (downloading on first use).

use anyhow::{Result, anyhow};
use hf_hub::api::sync::Api;
use std::path::{Path, PathBuf};
use tracing::info;

use docqa_core::config::{expand_path, EmbeddingSettings};

const WEIGHT_FILES: [&str; 2] = ["model.safetensors", "pytorch_model.bin"];

#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    pub fn is_safetensors(&self) -> bool {
        self.weights.extension().is_some_and(|ext| ext == "safetensors")
    }
}

pub fn resolve_model_files(settings: &EmbeddingSettings) -> Result<ModelFiles> {
    if let Some(dir) = settings.model_dir.as_deref() {
        let dir = expand_path(dir);
        if !dir.is_dir() {
            return Err(anyhow!("embedding.model_dir {} does not exist", dir.display()));
        }
        info!(model_dir = %dir.display(), "using local model directory");
        return from_dir(&dir);
    }
    info!(model_id = %settings.model_id, "fetching model from the Hugging Face Hub");
    let api = Api::new().map_err(|e| anyhow!("Failed to initialise hub client: {}", e))?;
    let repo = api.model(settings.model_id.clone());
    let config = repo.get("config.json").map_err(|e| anyhow!("Failed to fetch config.json: {}", e))?;
    let tokenizer = repo.get("tokenizer.json").map_err(|e| anyhow!("Failed to fetch tokenizer.json: {}", e))?;
    let weights = WEIGHT_FILES
        .iter()
        .find_map(|name| repo.get(name).ok())
        .ok_or_else(|| anyhow!("{} publishes none of {:?}", settings.model_id, WEIGHT_FILES))?;
    Ok(ModelFiles { config, tokenizer, weights })
}

fn from_dir(dir: &Path) -> Result<ModelFiles> {
    let config = dir.join("config.json");
    let tokenizer = dir.join("tokenizer.json");
    for required in [&config, &tokenizer] {
        if !required.is_file() {
            return Err(anyhow!("model file {} is missing", required.display()));
        }
    }
    let weights = WEIGHT_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .ok_or_else(|| anyhow!("no weights ({:?}) in {}", WEIGHT_FILES, dir.display()))?;
    Ok(ModelFiles { config, tokenizer, weights })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_dir_prefers_safetensors() {
        let tmp = std::env::temp_dir().join(format!("docqa-model-{}", std::process::id()));
        std::fs::create_dir_all(&tmp).unwrap();
        for f in ["config.json", "tokenizer.json", "model.safetensors", "pytorch_model.bin"] {
            std::fs::write(tmp.join(f), b"{}").unwrap();
        }
        let files = from_dir(&tmp).unwrap();
        assert!(files.is_safetensors());
        std::fs::remove_dir_all(&tmp).unwrap();
    }

    #[test]
    fn local_dir_without_weights_is_rejected() {
        let tmp = std::env::temp_dir().join(format!("docqa-model-empty-{}", std::process::id()));
        std::fs::create_dir_all(&tmp).unwrap();
        std::fs::write(tmp.join("config.json"), b"{}").unwrap();
        std::fs::write(tmp.join("tokenizer.json"), b"{}").unwrap();
        assert!(from_dir(&tmp).is_err());
        std::fs::remove_dir_all(&tmp).unwrap();
    }
}
