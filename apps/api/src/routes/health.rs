use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status and which optional integrations are enabled.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-coach",
        "speech": state.speech.is_some(),
        "session_store": if state.config.redis_url.is_some() { "redis" } else { "memory" },
    }))
}
