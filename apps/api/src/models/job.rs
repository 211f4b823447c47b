use serde::{Deserialize, Serialize};

/// A fetched job listing. Lives for one pipeline run only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub source_url: String,
    pub text: String,
}
