//! The external text-generation collaborator.
//!
//! `InferenceClient` speaks the OpenAI-compatible chat completions protocol
//! served by the Hugging Face inference router. Responses are decoded into
//! typed structs; anything without a first choice carrying text content is a
//! `MalformedResponse`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use docqa_core::config::GenerationSettings;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no credential in environment variable {0}")]
    MissingCredential(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Extract the first choice's text from a chat completions body.
pub fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("no choices returned".to_string()))?
        .message
        .content
        .ok_or_else(|| GenerationError::MalformedResponse("first choice has no content".to_string()))
}

#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    timeout: Duration,
    base_url: String,
    model: String,
    token: Option<String>,
    token_env: String,
}

impl InferenceClient {
    /// Build a client, reading the bearer token from `settings.token_env`.
    /// A missing token is reported per request, not here.
    pub fn new(settings: &GenerationSettings) -> Result<Self, GenerationError> {
        let token = std::env::var(&settings.token_env).ok().filter(|t| !t.trim().is_empty());
        Self::with_token(settings, token)
    }

    pub fn with_token(settings: &GenerationSettings, token: Option<String>) -> Result<Self, GenerationError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            timeout,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            token,
            token_env: settings.token_env.clone(),
        })
    }
}

#[async_trait]
impl Generator for InferenceClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| GenerationError::MissingCredential(self.token_env.clone()))?;
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &request.system },
                ChatMessage { role: "user", content: &request.prompt },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "querying generation service");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout)
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GenerationError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GenerationError::Status { status: status.as_u16(), body });
        }
        parse_completion(&body)
    }
}
