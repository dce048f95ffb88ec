use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(default)]
    pub user_id: String,
}

/// Unauthenticated read path. Clients re-check before every gated action, so
/// nothing here may be cached server-side.
pub async fn license_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Value>> {
    let user_id = query.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".into()));
    }

    let conn = state.db.get()?;
    let license = queries::get_license(&conn, user_id)?;

    Ok(Json(json!({
        "ok": true,
        "userId": user_id,
        "license": license,
        "upgradeUrl": state.config.checkout_url,
    })))
}
