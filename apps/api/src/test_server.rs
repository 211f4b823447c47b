//! Local HTTP upstreams for exercising the real clients in tests.

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::llm_client::{CHAT_MODEL, EMBEDDING_MODEL};

pub const OPENAI_KEY: &str = "test-openai-key";
/// A user prompt containing this marker gets a whitespace-only completion.
pub const BLANK_REPLY_MARKER: &str = "<<blank reply>>";
pub const CHAT_REPLY: &str = "Jane Doe\nRust Engineer\nSummary:\n• Built systems";

/// Serves `router` on an ephemeral loopback port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Minimal OpenAI stand-in mounted under `/v1`.
pub fn openai_router() -> Router {
    Router::new()
        .route("/v1/chat/completions", post(openai))
        .route("/v1/embeddings", post(openai))
}

async fn openai(uri: Uri, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let bearer = format!("Bearer {OPENAI_KEY}");
    if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(bearer.as_str()) {
        return error_reply(StatusCode::UNAUTHORIZED, "Incorrect API key provided");
    }

    match uri.path() {
        "/v1/embeddings" => {
            if body["model"] != EMBEDDING_MODEL {
                return error_reply(StatusCode::BAD_REQUEST, "unexpected embedding model");
            }
            Json(json!({
                "object": "list",
                "data": [{"object": "embedding", "index": 0, "embedding": [0.5, -0.25, 1.0]}],
                "usage": {"prompt_tokens": 3, "total_tokens": 3}
            }))
            .into_response()
        }
        _ => {
            if body["model"] != CHAT_MODEL {
                return error_reply(StatusCode::BAD_REQUEST, "unexpected chat model");
            }
            let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
            let content = if prompt.contains(BLANK_REPLY_MARKER) {
                "  \n  "
            } else {
                CHAT_REPLY
            };
            Json(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}],
                "usage": {"prompt_tokens": 40, "completion_tokens": 9, "total_tokens": 49}
            }))
            .into_response()
        }
    }
}

fn error_reply(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"message": message, "type": "invalid_request_error"}})),
    )
        .into_response()
}
