use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns every external collaborator; one run at a time.
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
