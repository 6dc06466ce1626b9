mod config;
mod errors;
mod flows;
mod llm_client;
mod questions;
mod routes;
mod sessions;
mod speech;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::inflight::InFlight;
use crate::sessions::store::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::speech::{GeminiSpeechClient, SpeechSynthesizer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Speech is optional; narration answers 503 without it
    let speech: Option<Arc<dyn SpeechSynthesizer>> = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiSpeechClient::new(key.clone())?;
            info!("Speech client initialized");
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set; narration disabled");
            None
        }
    };

    // Session store: Redis when configured, otherwise process memory
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Session store: redis (ttl {}s)", config.session_ttl_secs);
            Arc::new(RedisSessionStore::new(client, config.session_ttl_secs))
        }
        None => {
            info!("Session store: memory (ttl {}s)", config.session_ttl_secs);
            Arc::new(InMemorySessionStore::new(config.session_ttl_secs))
        }
    };

    let state = AppState {
        llm: Arc::new(llm),
        speech,
        sessions,
        inflight: InFlight::default(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
