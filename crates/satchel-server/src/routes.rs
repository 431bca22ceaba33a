use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

use satchel_bot::Engine;
use satchel_types::telegram::Update;

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// GET / and GET /webhook, for checking the deployment is up before
/// pointing Telegram's setWebhook at it.
pub async fn liveness() -> impl IntoResponse {
    Json(json!({ "message": "Satchel bot webhook active" }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /webhook, one Telegram update per request.
///
/// Telegram retries any non-2xx response, so a 500 here means the next
/// delivery attempt replays the same update against the engine.
pub async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> impl IntoResponse {
    match state.engine.handle_update(update).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            error!("Webhook handler error: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error")
        }
    }
}
