use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::sessions::inflight::InFlight;
use crate::sessions::store::SessionStore;
use crate::speech::SpeechSynthesizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text model behind every JSON flow. Anthropic in production.
    pub llm: Arc<dyn LanguageModel>,
    /// `None` when `GEMINI_API_KEY` is unset; narration then answers 503.
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub sessions: Arc<dyn SessionStore>,
    pub inflight: InFlight,
    pub config: Config,
}
