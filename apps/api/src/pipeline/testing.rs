//! In-process fakes for every pipeline seam, shared by pipeline and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::extract::ResumeExtractor;
use crate::generation::rewriter::ResumeRewriter;
use crate::layout::default_page_config;
use crate::listing::JobFetcher;
use crate::models::job::JobDescription;
use crate::models::resume::{OptimizedResume, ResumeRecord, CURRENT_RESUME_ID};
use crate::pipeline::Pipeline;
use crate::state::AppState;
use crate::vector_store::testing::{FakeEmbedder, InMemoryIndex};
use crate::vector_store::{VectorIndex, NAMESPACE};

pub const RESUME_TEXT: &str = "Jane Doe\nBackend developer\nPython, Rust, PostgreSQL";
pub const JOB_TEXT: &str = "Senior Rust Engineer\nBuild distributed systems in Rust";
pub const OPTIMIZED_TEXT: &str = "Jane Doe\nSenior Rust Engineer\n\
Summary:\n• Backend developer focused on Rust\n\
Skills:\n• Rust, Python, PostgreSQL\n\
Work Experience:\n• Built distributed systems\n\
Certificates:\nNone\n\
Education:\nBSc Computer Science";

pub struct FakeExtractor {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new(reply: Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResumeExtractor for FakeExtractor {
    async fn extract(&self, _pdf: &[u8]) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(AppError::Extraction)
    }
}

pub struct FakeFetcher {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobFetcher for FakeFetcher {
    async fn fetch(&self, url: &Url) -> Result<JobDescription, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::JobFetch(format!("{url}: connection refused")));
        }
        Ok(JobDescription {
            source_url: url.to_string(),
            text: JOB_TEXT.to_string(),
        })
    }
}

pub struct FakeRewriter {
    reply: Result<String, String>,
    calls: AtomicUsize,
    last: Mutex<Option<(String, String)>>,
}

impl FakeRewriter {
    pub fn new(reply: Result<String, String>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_inputs(&self) -> Option<(String, String)> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeRewriter for FakeRewriter {
    async fn rewrite(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<OptimizedResume, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((resume_text.to_string(), job_description.to_string()));
        self.reply
            .clone()
            .map(|text| OptimizedResume { text })
            .map_err(AppError::Llm)
    }
}

/// One set of fakes; keep the handles to inspect calls after a run.
pub struct Fakes {
    pub extractor: Arc<FakeExtractor>,
    pub fetcher: Arc<FakeFetcher>,
    pub embedder: Arc<FakeEmbedder>,
    pub index: Arc<InMemoryIndex>,
    pub rewriter: Arc<FakeRewriter>,
}

impl Fakes {
    pub fn new(extracted: Result<String, String>, rewritten: Result<String, String>) -> Self {
        Self::with_embedder(extracted, rewritten, FakeEmbedder::letter_counts())
    }

    pub fn with_embedder(
        extracted: Result<String, String>,
        rewritten: Result<String, String>,
        embedder: FakeEmbedder,
    ) -> Self {
        Self {
            extractor: Arc::new(FakeExtractor::new(extracted)),
            fetcher: Arc::new(FakeFetcher::ok()),
            embedder: Arc::new(embedder),
            index: Arc::new(InMemoryIndex::default()),
            rewriter: Arc::new(FakeRewriter::new(rewritten)),
        }
    }

    /// Puts a resume in the slot as if an earlier run had stored it.
    pub async fn seed_previous_resume(&self, text: &str) {
        let embedding = self.embedder.embed(text).await.unwrap();
        self.index
            .upsert(
                NAMESPACE,
                &ResumeRecord {
                    id: CURRENT_RESUME_ID.to_string(),
                    raw_text: text.to_string(),
                    embedding,
                },
            )
            .await
            .unwrap();
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.extractor.clone(),
            self.fetcher.clone(),
            self.embedder.clone(),
            self.index.clone(),
            self.rewriter.clone(),
            default_page_config(),
        )
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            pipeline: Arc::new(self.pipeline()),
            config: test_config(),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        openai_api_key: "test-openai".to_string(),
        openai_base_url: "http://127.0.0.1:9/v1".to_string(),
        pinecone_api_key: "test-pinecone".to_string(),
        pinecone_control_url: "http://127.0.0.1:9".to_string(),
        pinecone_index_host: Some("http://127.0.0.1:9".to_string()),
        max_upload_bytes: 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}
