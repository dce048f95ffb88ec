use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::models::LicenseRecord;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid request input. Surfaced verbatim to the caller.
    #[error("{0}")]
    BadRequest(String),
    /// Failed authentication (bad signature, bad admin token).
    #[error("{0}")]
    Unauthorized(&'static str),
    /// A gated endpoint was called without an active license. Carries the
    /// current record so the client can render an upgrade prompt.
    #[error("pro license required")]
    LicenseRequired(Box<LicenseRecord>),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LicenseRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Pool(_) | AppError::Sqlite(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match self {
            AppError::LicenseRequired(license) => json!({
                "ok": false,
                "error": "pro license required",
                "license": license,
            }),
            // Persistence details stay in the logs, not the response body.
            AppError::Pool(err) => {
                tracing::error!("database error: {err}");
                json!({ "ok": false, "error": "database error" })
            }
            AppError::Sqlite(err) => {
                tracing::error!("database error: {err}");
                json!({ "ok": false, "error": "database error" })
            }
            other => json!({ "ok": false, "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
