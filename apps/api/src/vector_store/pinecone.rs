//! Pinecone REST client for the resume index.
//!
//! The data-plane host is resolved once at startup from the control plane, so an
//! unreachable or unknown index fails the process before the page is served.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::models::resume::ResumeRecord;
use crate::vector_store::{IndexMatch, VectorIndex, VectorStoreError};

/// The index every resume is stored in.
pub const INDEX_NAME: &str = "resumebuilder";
const API_VERSION: &str = "2024-07";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_values: bool,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    values: Vec<f32>,
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PineconeError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<PineconeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct PineconeErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    /// Data-plane base URL, e.g. `https://resumebuilder-abc123.svc.pinecone.io`.
    host: String,
}

impl PineconeIndex {
    /// Uses an already known data-plane host.
    pub fn with_host(client: Client, api_key: String, host: &str) -> Self {
        Self {
            client,
            api_key,
            host: normalize_host(host),
        }
    }

    /// Resolves the data-plane host of `INDEX_NAME` through the control plane.
    pub async fn connect(
        client: Client,
        api_key: String,
        control_url: &str,
    ) -> Result<Self, VectorStoreError> {
        let url = format!("{}/indexes/{INDEX_NAME}", control_url.trim_end_matches('/'));
        let response = client
            .get(url)
            .header("Api-Key", &api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        let described: DescribeIndexResponse = read_json(response).await?;
        let host = described
            .host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| VectorStoreError::MissingHost(INDEX_NAME.to_string()))?;

        info!("Resolved Pinecone index '{INDEX_NAME}' at {host}");
        Ok(Self::with_host(client, api_key, &host))
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, VectorStoreError> {
        Ok(self
            .client
            .post(format!("{}/{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await?)
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, record: &ResumeRecord) -> Result<(), VectorStoreError> {
        let body = UpsertRequest {
            vectors: vec![UpsertVector {
                id: &record.id,
                values: &record.embedding,
                metadata: json!({ "text": record.raw_text }),
            }],
            namespace,
        };
        let response = self.post("vectors/upsert", &body).await?;
        let _: Value = read_json(response).await?;
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<IndexMatch>, VectorStoreError> {
        let body = QueryRequest {
            namespace,
            vector,
            top_k,
            include_values: true,
            include_metadata: true,
        };
        let response = self.post("query", &body).await?;
        let parsed: QueryResponse = read_json(response).await?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                values: m.values,
                metadata: m.metadata,
            })
            .collect())
    }
}

/// Accepts hosts with or without a scheme; the describe call returns them bare.
fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, VectorStoreError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VectorStoreError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }
    Ok(response.json::<T>().await?)
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<PineconeError>(body) {
        Ok(PineconeError {
            error: Some(inner), ..
        }) => inner.message,
        Ok(PineconeError {
            message: Some(message),
            ..
        }) => message,
        _ => body.to_string(),
    }
}
