use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::ai::{RefineContext, local_fallback_prompt};
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_mode")]
    pub mode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub context: RefineContext,
}

fn default_mode() -> String {
    "concise".to_string()
}

pub async fn improve_prompt(
    State(state): State<AppState>,
    Json(body): Json<ImproveRequest>,
) -> Result<Json<Value>> {
    check_access(&state, body.user_id.trim(), &body.text)?;
    let outcome = state.ai.improve(&body.text, &body.mode).await;
    Ok(ai_response(&state, outcome, &body.text))
}

pub async fn refine_prompt(
    State(state): State<AppState>,
    Json(body): Json<RefineRequest>,
) -> Result<Json<Value>> {
    check_access(&state, body.user_id.trim(), &body.text)?;
    let outcome = state.ai.refine(&body.text, &body.mode, &body.context).await;
    Ok(ai_response(&state, outcome, &body.text))
}

/// License state can change between a page-load and the next prompt
/// request, so every call re-reads the store.
fn check_access(state: &AppState, user_id: &str, text: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".into()));
    }
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("text is required".into()));
    }
    if state.config.require_pro {
        let conn = state.db.get()?;
        let license = queries::get_license(&conn, user_id)?;
        if !license.is_active {
            return Err(AppError::LicenseRequired(Box::new(license)));
        }
    }
    Ok(())
}

/// AI failure degrades to a deterministic local prompt with a warning, not
/// an error status: the extension always gets something usable to insert.
fn ai_response(state: &AppState, outcome: Result<String>, text: &str) -> Json<Value> {
    match outcome {
        Ok(output) => Json(json!({
            "ok": true,
            "output": output,
            "model": state.config.openai_model,
            "source": "openai",
        })),
        Err(err) => {
            tracing::warn!("ai call failed, serving local fallback: {err}");
            Json(json!({
                "ok": true,
                "output": local_fallback_prompt(text),
                "source": "local-fallback",
                "warning": err.to_string(),
            }))
        }
    }
}
