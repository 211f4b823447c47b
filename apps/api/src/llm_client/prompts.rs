// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to prompts whose output is consumed verbatim by a parser.
pub const NO_COMMENTARY_INSTRUCTION: &str =
    "Do not include any additional text or explanations outside of the resume content.";
