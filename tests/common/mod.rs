//! Shared helpers for integration tests: tempfile-backed state, router
//! construction, webhook signing.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tempfile::TempDir;

use prompt_qa_server::ai::AiClient;
use prompt_qa_server::config::Config;
use prompt_qa_server::db::{self, AppState};
use prompt_qa_server::handlers;

pub const TEST_ADMIN_TOKEN: &str = "test-admin-token";
pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Baseline test configuration: pro variant "12345" configured, admin token
/// and webhook secret set, license gating on, AI mocked.
pub fn test_config(dir: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned(),
        admin_token: TEST_ADMIN_TOKEN.to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        pro_variant_ids: vec!["12345".to_string()],
        checkout_url: Some("https://store.example.com/checkout".to_string()),
        openai_api_key: String::new(),
        openai_model: "gpt-4.1-mini".to_string(),
        openai_base_url: "http://127.0.0.1:9".to_string(),
        openai_timeout_secs: 1,
        mock_ai: true,
        require_pro: true,
        event_log_limit: 200,
    }
}

pub fn build_state(config: Config) -> AppState {
    let pool = db::init_pool(&config.database_path).expect("init db");
    let ai = AiClient::new(&config).expect("build ai client");
    AppState {
        db: pool,
        config: Arc::new(config),
        ai,
    }
}

/// Default state; the returned TempDir must stay alive for the db file.
pub fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("tempdir");
    let config = test_config(&dir);
    (dir, build_state(config))
}

pub fn test_app(state: AppState) -> Router {
    handlers::router(state)
}

/// Hex HMAC-SHA-256 of a webhook body with the test secret, as the payment
/// provider would send in `x-signature`.
pub fn sign(body: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(TEST_WEBHOOK_SECRET.as_bytes()).expect("hmac key");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
