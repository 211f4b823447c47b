use anyhow::{Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_PINECONE_CONTROL_URL: &str = "https://api.pinecone.io";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if the vector store key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Not validated at startup; a missing key surfaces as an upstream 401 on first use.
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub pinecone_api_key: String,
    pub pinecone_control_url: String,
    /// Skips the control-plane host lookup when set.
    pub pinecone_index_host: Option<String>,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            pinecone_api_key: require_env("PINECONE_API_KEY")
                .context("Pinecone API key not found. Please check your .env file")?,
            pinecone_control_url: optional_env("PINECONE_CONTROL_URL")
                .unwrap_or_else(|| DEFAULT_PINECONE_CONTROL_URL.to_string()),
            pinecone_index_host: optional_env("PINECONE_INDEX_HOST"),
            max_upload_bytes: match optional_env("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    match optional_env(key) {
        Some(value) => Ok(value),
        None => anyhow::bail!("Required environment variable '{key}' is not set"),
    }
}

/// Treats set-but-blank variables as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
