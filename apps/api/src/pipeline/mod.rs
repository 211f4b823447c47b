//! Resume optimization pipeline.
//!
//! extract → upsert → fetch → embed → query → rewrite → parse → render, strictly in
//! sequence. Each stage returns a `Result`; this module decides which failures degrade
//! the run (recorded as notices) and which end it.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Url;
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::AppError;
use crate::extract::ResumeExtractor;
use crate::generation::rewriter::ResumeRewriter;
use crate::layout::page_fill::{PageFillAnalysis, PageFillVerdict};
use crate::layout::{parse_outline, render_resume, unsupported_chars, PageConfig};
use crate::listing::{parse_job_url, JobFetcher};
use crate::models::resume::{MatchResult, RenderedDocument, CURRENT_RESUME_ID};
use crate::vector_store::{ResumeVectorStore, UpsertOutcome, VectorIndex};

pub mod handlers;

#[cfg(test)]
pub(crate) mod testing;

/// Validated trigger input. Constructing one is the only way to start a run.
#[derive(Debug, Clone)]
pub struct OptimizeInput {
    pub resume_pdf: Bytes,
    pub job_url: Url,
}

impl OptimizeInput {
    /// Both inputs are required; nothing runs unless both are present and non-empty.
    pub fn new(resume_pdf: Option<Bytes>, job_url: Option<String>) -> Result<Self, AppError> {
        let resume_pdf = resume_pdf.filter(|b| !b.is_empty());
        let job_url = job_url.filter(|u| !u.trim().is_empty());

        match (resume_pdf, job_url) {
            (Some(resume_pdf), Some(job_url)) => Ok(Self {
                resume_pdf,
                job_url: parse_job_url(&job_url)?,
            }),
            _ => Err(AppError::Validation(
                "Please upload your resume PDF and provide a job description URL.".to_string(),
            )),
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub document: RenderedDocument,
    pub best_match: MatchResult,
    /// Text extracted from the upload; empty when extraction failed.
    pub resume_text: String,
    pub page_fill: PageFillAnalysis,
    /// Degradations the run continued through, in stage order.
    pub notices: Vec<String>,
}

pub struct Pipeline {
    extractor: Arc<dyn ResumeExtractor>,
    fetcher: Arc<dyn JobFetcher>,
    embedder: Arc<dyn Embedder>,
    store: ResumeVectorStore,
    rewriter: Arc<dyn ResumeRewriter>,
    page_config: PageConfig,
    /// The store has a single slot, so runs must not interleave.
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn ResumeExtractor>,
        fetcher: Arc<dyn JobFetcher>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        rewriter: Arc<dyn ResumeRewriter>,
        page_config: PageConfig,
    ) -> Self {
        Self {
            store: ResumeVectorStore::new(embedder.clone(), index),
            extractor,
            fetcher,
            embedder,
            rewriter,
            page_config,
            run_lock: Mutex::new(()),
        }
    }

    pub async fn run(&self, input: OptimizeInput) -> Result<PipelineOutcome, AppError> {
        let _slot = self.run_lock.lock().await;
        let request_id = Uuid::new_v4();
        self.run_stages(input)
            .instrument(info_span!("optimize", %request_id))
            .await
    }

    async fn run_stages(&self, input: OptimizeInput) -> Result<PipelineOutcome, AppError> {
        let mut notices = Vec::new();
        info!(
            "Processing resume ({} bytes) and job description {}",
            input.resume_pdf.len(),
            input.job_url
        );

        // Extraction failure degrades to an empty resume; matching may still hit
        // whatever a previous run left in the slot.
        let resume_text = match self.extractor.extract(&input.resume_pdf).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{e}; continuing with empty resume text");
                notices.push(format!("{e}. Continuing with empty resume text."));
                String::new()
            }
        };

        match self.store.upsert(CURRENT_RESUME_ID, &resume_text).await {
            Ok(UpsertOutcome::Stored { .. }) => {}
            Ok(UpsertOutcome::Skipped { reason }) => {
                notices.push(format!("Resume was not stored ({reason})."));
            }
            Err(AppError::Embedding(msg)) => {
                warn!("Resume embedding failed, upsert skipped: {msg}");
                notices.push(format!("Resume was not stored ({msg})."));
            }
            Err(e) => return Err(e),
        }

        let job = self.fetcher.fetch(&input.job_url).await?;
        let job_vector = self.embedder.embed(&job.text).await?;
        let matches = self.store.query(&job_vector).await?;

        let best_match = matches.into_iter().next().ok_or_else(|| {
            AppError::NoMatch("The resume index returned no results.".to_string())
        })?;
        let matched_text = best_match.matched_text.clone().ok_or_else(|| {
            AppError::NoMatch(format!(
                "Match '{}' carries no resume text.",
                best_match.resume_id
            ))
        })?;
        info!(
            "Best match '{}' (score {:.4})",
            best_match.resume_id, best_match.score
        );

        let optimized = self.rewriter.rewrite(&matched_text, &job.text).await?;
        let outline = parse_outline(&optimized.text)
            .map_err(|e| AppError::MalformedResume(e.to_string()))?;
        for warning in &outline.warnings {
            warn!("Rewritten resume: {warning}");
            notices.push(format!("Rewritten resume: {warning}."));
        }

        let missing = unsupported_chars(&outline);
        if !missing.is_empty() {
            let listed = missing
                .iter()
                .map(|c| format!("'{c}' (U+{:04X})", *c as u32))
                .collect::<Vec<_>>()
                .join(", ");
            warn!("PDF font cannot draw {} character(s): {listed}", missing.len());
            notices.push(format!(
                "Characters the PDF font cannot draw were left out of the document: {listed}."
            ));
        }

        let (document, page_fill) = render_resume(outline, self.page_config.clone()).await?;
        if let PageFillVerdict::Overflow { extra_pages } = page_fill.verdict {
            notices.push(format!(
                "Optimized resume runs {extra_pages} page(s) past one page."
            ));
        }

        Ok(PipelineOutcome {
            document,
            best_match,
            resume_text,
            page_fill,
            notices,
        })
    }
}
