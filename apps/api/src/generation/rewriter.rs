//! Resume Rewriter: asks the chat model to tailor the matched resume to a job.

use async_trait::async_trait;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{build_optimize_prompt, OPTIMIZE_SYSTEM};
use crate::llm_client::LlmClient;
use crate::models::resume::OptimizedResume;

/// Carried in the pipeline as `Arc<dyn ResumeRewriter>`.
#[async_trait]
pub trait ResumeRewriter: Send + Sync {
    async fn rewrite(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<OptimizedResume, AppError>;
}

/// Single chat-completion call, no retry. Returns the trimmed response text.
pub struct LlmResumeRewriter(pub LlmClient);

#[async_trait]
impl ResumeRewriter for LlmResumeRewriter {
    async fn rewrite(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<OptimizedResume, AppError> {
        let prompt = build_optimize_prompt(resume_text, job_description);
        let text = self
            .0
            .chat_text(OPTIMIZE_SYSTEM, &prompt)
            .await
            .map_err(|e| AppError::llm("Resume optimization failed", e))?;

        info!("Rewriter returned {} lines", text.lines().count());
        Ok(OptimizedResume { text })
    }
}
