//! Embedding Client: text to a fixed-length vector via the hosted embedding model.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::LlmClient;

/// Carried as `Arc<dyn Embedder>` by the vector store and the pipeline.
///
/// An `Ok` empty vector means "no embedding available"; callers skip dependent steps.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;
}

pub struct OpenAiEmbedder(pub LlmClient);

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.0
            .embed(text)
            .await
            .map_err(|e| AppError::Embedding(format!("Error generating embedding: {e}")))
    }
}
