use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::vector_store::VectorStoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No matching resumes found: {0}")]
    NoMatch(String),

    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("Job description fetch error: {0}")]
    JobFetch(String),

    #[error("Job description is empty: {0}")]
    EmptyJobDescription(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Malformed resume: {0}")]
    MalformedResume(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn llm(context: &str, err: LlmError) -> Self {
        AppError::Llm(format!("{context}: {err}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoMatch(_) => StatusCode::NOT_FOUND,
            AppError::Extraction(_)
            | AppError::EmptyJobDescription(_)
            | AppError::MalformedResume(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::JobFetch(_)
            | AppError::Embedding(_)
            | AppError::VectorStore(_)
            | AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::NoMatch(msg) => ("NO_MATCH", format!("No matching resumes found. {msg}")),
            AppError::Extraction(msg) => ("EXTRACTION_ERROR", msg.clone()),
            AppError::EmptyJobDescription(msg) => ("EMPTY_JOB_DESCRIPTION", msg.clone()),
            AppError::MalformedResume(msg) => {
                tracing::warn!("Rewritten resume rejected: {msg}");
                ("MALFORMED_RESUME", msg.clone())
            }
            AppError::JobFetch(msg) => {
                tracing::error!("Job fetch error: {msg}");
                (
                    "JOB_FETCH_ERROR",
                    format!("Error fetching job description: {msg}"),
                )
            }
            AppError::Embedding(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    "EMBEDDING_ERROR",
                    "Error generating embedding".to_string(),
                )
            }
            AppError::VectorStore(e) => {
                tracing::error!("Vector store error: {e}");
                (
                    "VECTOR_STORE_ERROR",
                    "A vector store error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                ("LLM_ERROR", "Error optimizing resume".to_string())
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                ("RENDER_ERROR", "Error rendering the resume PDF".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_no_match_maps_to_not_found() {
        let response = AppError::NoMatch("index empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_failures_map_to_bad_gateway() {
        assert_eq!(
            AppError::Embedding("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::Llm("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::JobFetch("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_malformed_resume_is_unprocessable() {
        assert_eq!(
            AppError::MalformedResume("no sections".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn test_error_body_carries_code_and_message() {
        let response = AppError::Validation("job_url is required".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "job_url is required");
    }
}
