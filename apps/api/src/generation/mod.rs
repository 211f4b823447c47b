// Resume Rewriter: prompt construction and the chat-completion call.
// All LLM calls go through llm_client; no direct OpenAI calls here.

pub mod prompts;
pub mod rewriter;
