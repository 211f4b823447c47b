use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The single slot every upload is written to. A new upload overwrites the previous one.
pub const CURRENT_RESUME_ID: &str = "current_resume";

/// A resume as written into the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub raw_text: String,
    pub embedding: Vec<f32>,
}

/// The nearest stored resume for a job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub resume_id: String,
    pub score: f32,
    /// `None` when the index entry carries no `text` metadata.
    pub matched_text: Option<String>,
}

/// Resume text as returned by the rewriter, before outline parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedResume {
    pub text: String,
}

/// A finished PDF, readable from the first byte.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Bytes,
    pub page_count: usize,
}
