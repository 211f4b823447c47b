mod config;
mod embedding;
mod errors;
mod extract;
mod generation;
mod layout;
mod listing;
mod llm_client;
mod models;
mod pipeline;
mod routes;
mod state;
mod vector_store;

#[cfg(test)]
mod test_server;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::OpenAiEmbedder;
use crate::extract::PdfTextExtractor;
use crate::generation::rewriter::LlmResumeRewriter;
use crate::layout::default_page_config;
use crate::listing::HttpJobFetcher;
use crate::llm_client::LlmClient;
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vector_store::pinecone::{PineconeIndex, INDEX_NAME};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer v{}", env!("CARGO_PKG_VERSION"));

    // One HTTP client shared by every upstream
    let http = reqwest::Client::builder()
        .user_agent(concat!("resume-optimizer/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    if config.openai_api_key.is_empty() {
        warn!("OPENAI_API_KEY is not set; embedding and rewrite calls will be rejected upstream");
    }
    let llm = LlmClient::new(
        http.clone(),
        config.openai_api_key.clone(),
        &config.openai_base_url,
    );
    info!(
        "LLM client initialized (chat: {}, embeddings: {})",
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_MODEL
    );

    // Resolve the vector index; an unreachable index is a startup error
    let index = match &config.pinecone_index_host {
        Some(host) => PineconeIndex::with_host(http.clone(), config.pinecone_api_key.clone(), host),
        None => PineconeIndex::connect(
            http.clone(),
            config.pinecone_api_key.clone(),
            &config.pinecone_control_url,
        )
        .await
        .with_context(|| format!("failed to connect to Pinecone index '{INDEX_NAME}'"))?,
    };

    let page_config = default_page_config();
    info!(
        "Layout page config: {}x{}pt, {}pt side margins",
        page_config.page_width_pt, page_config.page_height_pt, page_config.margin_left_pt
    );

    let pipeline = Pipeline::new(
        Arc::new(PdfTextExtractor),
        Arc::new(HttpJobFetcher::new(http)),
        Arc::new(OpenAiEmbedder(llm.clone())),
        Arc::new(index),
        Arc::new(LlmResumeRewriter(llm)),
        page_config,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
