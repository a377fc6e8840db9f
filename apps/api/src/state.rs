use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmGateway;
use crate::resume::normalizer::ResumeNormalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Anthropic-backed in production; tests swap in a scripted gateway.
    pub gateway: Arc<dyn LlmGateway>,
    pub normalizer: Arc<ResumeNormalizer>,
    pub config: Config,
}
