use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Config;
use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::models::{LicensePatch, LicenseSource, Plan};

/// Admin requests must carry the exact configured token in `x-admin-token`.
/// An empty configured token rejects everything; unlike the pro-variant
/// allow-list there is no unconfigured-open mode on this surface.
pub fn require_admin(config: &Config, headers: &HeaderMap) -> Result<()> {
    let token = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if config.admin_token.is_empty() || token != config.admin_token {
        return Err(AppError::Unauthorized("unauthorized"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub source: Option<LicenseSource>,
}

/// Manual license override, e.g. refunds, comps, support escalations.
pub async fn activate_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActivateRequest>,
) -> Result<Json<Value>> {
    require_admin(&state.config, &headers)?;

    let user_id = body.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".into()));
    }

    let patch = LicensePatch {
        plan: Some(body.plan.unwrap_or(Plan::Pro)),
        is_active: Some(body.is_active.unwrap_or(true)),
        source: Some(body.source.unwrap_or(LicenseSource::Manual)),
        ..Default::default()
    };

    let mut conn = state.db.get()?;
    let license = queries::upsert_license(&mut conn, user_id, &patch)?;
    tracing::info!(user = %user_id, active = license.is_active, "manual license override");

    Ok(Json(json!({ "ok": true, "license": license })))
}

/// Unauthenticated deployment diagnostics. Flags only, never secrets.
pub async fn diag(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "mockAi": state.config.mock_ai,
        "requirePro": state.config.require_pro,
        "model": state.config.openai_model,
    }))
}

/// Round-trip a fixed ping through the AI provider.
pub async fn openai_probe(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    require_admin(&state.config, &headers)?;
    let output = state.ai.probe().await?;
    Ok(Json(json!({ "ok": true, "output": output, "source": "openai" })))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn recent_audit_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Value>> {
    require_admin(&state.config, &headers)?;

    let limit = query
        .limit
        .unwrap_or(50)
        .min(state.config.event_log_limit);
    let conn = state.db.get()?;
    let events = queries::recent_events(&conn, limit)?;

    Ok(Json(json!({ "ok": true, "events": events })))
}
