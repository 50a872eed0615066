use std::sync::Arc;

use crate::config::Config;
use crate::interview::store::SessionStore;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generative-text backend. Default: `GeminiClient`.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(llm: Arc<dyn TextGenerator>, config: Config) -> Self {
        let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
        Self {
            llm,
            config,
            sessions,
        }
    }
}
