use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::lemonsqueezy::{WebhookEvent, resolve_license_patch, verify_signature};
use crate::models::CreateAuditEvent;

/// Ingest one LemonSqueezy webhook delivery.
///
/// Verification runs over the exact wire bytes; the JSON parse happens
/// strictly after. There is no retry here: the provider redelivers failed
/// webhooks, and the resolver's purity makes replay idempotent.
pub async fn lemonsqueezy_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let signature = headers.get("x-signature").and_then(|v| v.to_str().ok());

    if !verify_signature(&body, signature, &state.config.webhook_secret) {
        tracing::warn!("rejected lemonsqueezy webhook: invalid signature");
        return Err(AppError::Unauthorized("invalid signature"));
    }

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("invalid json payload".into()))?;

    let event = WebhookEvent::parse(&payload);

    // Every verified delivery lands on the audit trail, including the ones
    // we go on to ignore.
    let mut conn = state.db.get()?;
    queries::add_event(
        &conn,
        &CreateAuditEvent {
            event_type: "lemonsqueezy".to_string(),
            event_name: event.event_name.clone(),
            user_id: event.user_id.clone(),
            email: event.email.clone(),
            variant_id: event.variant_id.clone(),
            test_mode: event.test_mode,
        },
        state.config.event_log_limit,
    )?;

    let Some(user_id) = event.user_id.clone() else {
        return Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "ok": true, "ignored": true, "reason": "no user identifier in payload" })),
        ));
    };

    let Some(patch) = resolve_license_patch(&event, &state.config.pro_variant_ids) else {
        return Ok((
            StatusCode::ACCEPTED,
            Json(json!({ "ok": true, "ignored": true, "reason": "event not mapped" })),
        ));
    };

    let license = queries::upsert_license(&mut conn, &user_id, &patch)?;
    tracing::info!(
        event = %event.event_name,
        user = %user_id,
        active = license.is_active,
        test_mode = event.test_mode,
        "license updated from webhook"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "ok": true,
            "updated": true,
            "license": license,
            "event": event.event_name,
        })),
    ))
}
