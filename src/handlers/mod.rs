mod admin;
mod license;
mod prompt;
mod webhook;

pub use admin::*;
pub use license::*;
pub use prompt::*;
pub use webhook::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::AppState;

async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "prompt-qa-copilot-server",
        "time": Utc::now().to_rfc3339(),
    }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/diag", get(diag))
        .route("/api/license/status", get(license_status))
        .route("/api/license/activate", post(activate_license))
        .route("/api/lemonsqueezy/webhook", post(lemonsqueezy_webhook))
        .route("/api/prompt/improve", post(improve_prompt))
        .route("/api/prompt/refine", post(refine_prompt))
        .route("/api/admin/openai-probe", get(openai_probe))
        .route("/api/admin/events", get(recent_audit_events))
        // The extension calls in from arbitrary page origins.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
