use std::env;

/// Process configuration, built once at startup and shared via `AppState`.
/// Components never read environment variables at call time.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Token for the `x-admin-token` header. Empty disables all admin
    /// endpoints (they return 401 unconditionally).
    pub admin_token: String,
    /// Shared secret for webhook HMAC verification. Empty rejects all
    /// webhook deliveries.
    pub webhook_secret: String,
    /// Pro-tier variant allow-list. An EMPTY list is fail-open: every paid
    /// variant counts as pro. See README before deploying.
    pub pro_variant_ids: Vec<String>,
    pub checkout_url: Option<String>,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_timeout_secs: u64,
    /// Return deterministic mock output instead of calling the AI provider.
    pub mock_ai: bool,
    /// Gate the prompt endpoints on an active license.
    pub require_pro: bool,
    /// Retention bound for the audit event log.
    pub event_log_limit: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8787);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "prompt_qa.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_default(),
            webhook_secret: env::var("LEMON_SQUEEZY_WEBHOOK_SECRET").unwrap_or_default(),
            pro_variant_ids: parse_id_list(
                &env::var("LEMON_SQUEEZY_PRO_VARIANT_IDS").unwrap_or_default(),
            ),
            checkout_url: env::var("LEMON_SQUEEZY_CHECKOUT_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4.1-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            openai_timeout_secs: env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            mock_ai: env_flag("MOCK_AI"),
            require_pro: env_flag("REQUIRE_PRO"),
            event_log_limit: env::var("EVENT_LOG_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(200),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated id list; whitespace and empty entries are dropped.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
