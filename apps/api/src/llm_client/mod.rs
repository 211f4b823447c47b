//! LLM Client: the single point of entry for all OpenAI API calls.
//!
//! Both the embedding model and the chat model are reached through this module;
//! no other module talks to the OpenAI API directly.
//!
//! Models are hardcoded to keep stored vectors comparable across runs.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// The model used for every chat completion.
pub const CHAT_MODEL: &str = "gpt-3.5-turbo";
/// The model used for every embedding. Changing it invalidates the stored index.
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Wraps the OpenAI chat-completion and embedding endpoints.
/// Single attempt per call; failures are returned to the caller as `LlmError`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(client: Client, api_key: String, base_url: &str) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Sends one system + user exchange to the chat model.
    pub async fn chat(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response: ChatResponse = self.post("chat/completions", &request_body).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response)
    }

    /// Convenience wrapper returning the trimmed text of the first choice.
    pub async fn chat_text(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.chat(system, prompt).await?;
        let text = response.text().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }

    /// Embeds a single input and returns the first vector of the response.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input,
        };

        let response: EmbeddingResponse = self.post("embeddings", &request_body).await?;

        if let Some(usage) = &response.usage {
            debug!("Embedding call succeeded: prompt_tokens={}", usage.prompt_tokens);
        }

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyContent)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, LlmError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(LlmError::Parse)
    }
}

/// Pulls `error.message` out of an OpenAI error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<OpenAiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}
