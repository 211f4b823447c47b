// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::NO_COMMENTARY_INSTRUCTION;

/// System prompt for resume optimization.
pub const OPTIMIZE_SYSTEM: &str = "You are a professional resume optimizer.";

/// Fixed instructions placed ahead of the job description and resume.
/// Section names and the bullet glyph must stay in sync with `layout::outline`.
pub const OPTIMIZE_INSTRUCTIONS: &str = "Optimize the following resume for the job description.
The optimized resume should include the following sections in order:
Summary, Skills, Work Experience, Certificates, and Education.
Start with the person's name and the profession mentioned in the job description.
Ensure all work experience is included, but prioritize relevant experience.
The entire resume must fit on one page, so be concise while preserving key information.
Use bullet points (•) for listing items, not dashes (-).";

/// Builds the user message. Inputs are interpolated once, never re-scanned for placeholders.
pub fn build_optimize_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "{OPTIMIZE_INSTRUCTIONS}\n{NO_COMMENTARY_INSTRUCTION}\n\n\
         Job Description: {job_description}\n\n\
         Resume:\n{resume_text}"
    )
}
