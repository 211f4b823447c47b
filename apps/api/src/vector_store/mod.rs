//! Resume Vector Store: upsert and nearest-neighbour query against a namespaced index.
//!
//! Scoring and ranking belong to the index; this module only shapes requests and
//! results. The index is reached through `VectorIndex` so it can be swapped in tests.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::models::resume::{MatchResult, ResumeRecord};

pub mod pinecone;

/// Every resume lives in this namespace of the index.
pub const NAMESPACE: &str = "ns1";
/// Only the single nearest neighbour is ever consumed.
pub const TOP_K: usize = 1;

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Index '{0}' has no host")]
    MissingHost(String),
}

/// A raw match as returned by the index.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub values: Vec<f32>,
    pub metadata: Option<Value>,
}

impl IndexMatch {
    pub fn into_match_result(self) -> MatchResult {
        let matched_text = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("text"))
            .and_then(Value::as_str)
            .map(String::from);
        MatchResult {
            resume_id: self.id,
            score: self.score,
            matched_text,
        }
    }
}

/// External index operations. Carried as `Arc<dyn VectorIndex>`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Writes the record under `namespace`, replacing any entry with the same id.
    async fn upsert(&self, namespace: &str, record: &ResumeRecord) -> Result<(), VectorStoreError>;

    /// Returns up to `top_k` nearest entries, values and metadata included.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexMatch>, VectorStoreError>;
}

/// Result of an upsert request.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Stored { dimension: usize },
    Skipped { reason: String },
}

#[derive(Clone)]
pub struct ResumeVectorStore {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl ResumeVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embeds `text` and writes it under `id`.
    ///
    /// Blank text and empty embeddings skip the write. Embedding failures are returned
    /// as `AppError::Embedding` so the caller can decide whether to continue.
    pub async fn upsert(&self, id: &str, text: &str) -> Result<UpsertOutcome, AppError> {
        if text.trim().is_empty() {
            warn!("Resume text is empty, skipping upsert of '{id}'");
            return Ok(UpsertOutcome::Skipped {
                reason: "resume text is empty".to_string(),
            });
        }

        let embedding = self.embedder.embed(text).await?;
        if embedding.is_empty() {
            warn!("Embedding for '{id}' is empty, skipping upsert");
            return Ok(UpsertOutcome::Skipped {
                reason: "embedding is empty".to_string(),
            });
        }

        let record = ResumeRecord {
            id: id.to_string(),
            raw_text: text.to_string(),
            embedding,
        };
        self.index.upsert(NAMESPACE, &record).await?;

        let dimension = record.embedding.len();
        info!("Upserted resume '{id}' ({dimension} dims) into namespace {NAMESPACE}");
        Ok(UpsertOutcome::Stored { dimension })
    }

    /// Nearest stored resume(s) for `vector`. An empty vector yields no matches
    /// without contacting the index.
    pub async fn query(&self, vector: &[f32]) -> Result<Vec<MatchResult>, AppError> {
        if vector.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self.index.query(NAMESPACE, vector, TOP_K).await?;
        for m in &matches {
            debug!(
                "Match '{}' score={:.4} dims={}",
                m.id,
                m.score,
                m.values.len()
            );
        }
        Ok(matches
            .into_iter()
            .map(IndexMatch::into_match_result)
            .collect())
    }
}
