//! Prompt assembly and the generator call.
//!
//! `compose` never fails: any generation error or timeout turns into the
//! fixed fallback answer with a `Failed` outcome.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use docqa_core::config::GenerationSettings;

use crate::generator::{GenerationError, GenerationRequest, Generator};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const FALLBACK_ANSWER: &str = "Sorry, there was an error communicating with the Inference Client.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Answered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub answer: String,
    pub outcome: Outcome,
}

impl Composition {
    pub fn fallback() -> Self { Self { answer: FALLBACK_ANSWER.to_string(), outcome: Outcome::Failed } }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposerConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ComposerConfig {
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self { Self::from_settings(&GenerationSettings::default()) }
}

/// Context chunks are joined by newlines, in retrieval order.
pub fn build_prompt(question: &str, chunks: &[String]) -> String {
    format!(
        "Answer the question based on the context.\n\nContext:\n{}\n\nQuestion: {}\nAnswer:",
        chunks.join("\n"),
        question
    )
}

pub struct AnswerComposer {
    generator: Arc<dyn Generator>,
    config: ComposerConfig,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn Generator>, config: ComposerConfig) -> Self { Self { generator, config } }

    pub fn config(&self) -> &ComposerConfig { &self.config }

    pub fn request_for(&self, question: &str, chunks: &[String]) -> GenerationRequest {
        GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(question, chunks),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    pub async fn compose(&self, question: &str, chunks: &[String]) -> Composition {
        let request = self.request_for(question, chunks);
        let result = match tokio::time::timeout(self.config.timeout, self.generator.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.config.timeout)),
        };
        match result {
            Ok(text) => {
                info!(context_chunks = chunks.len(), "answer generated");
                Composition { answer: text.trim().to_string(), outcome: Outcome::Answered }
            }
            Err(e) => {
                warn!(error = %e, "generation failed, returning fallback answer");
                Composition::fallback()
            }
        }
    }
}
