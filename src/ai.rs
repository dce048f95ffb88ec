//! OpenAI collaborator client and the deterministic local fallback.
//!
//! The client tries the Responses API first and falls back to Chat
//! Completions, with a bounded per-request timeout. When the whole call
//! fails, handlers serve `local_fallback_prompt` instead of an error: some
//! usable output beats surfacing the upstream failure.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct AiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    mock: bool,
}

/// Optional guidance fields for the refine endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefineContext {
    pub goal: String,
    pub tone: String,
    pub constraints: String,
    pub output_format: String,
}

impl AiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            mock: config.mock_ai,
        })
    }

    pub async fn improve(&self, text: &str, mode: &str) -> Result<String> {
        let system = "You are Prompt QA Copilot. Rewrite user text into a high-quality AI prompt. \
                      Keep intent unchanged. Return only the rewritten prompt.";
        let user = format!("Mode: {mode}\nText:\n{text}");
        self.complete(system, &user).await
    }

    pub async fn refine(&self, text: &str, mode: &str, context: &RefineContext) -> Result<String> {
        let system = "You are Prompt QA Copilot. Refine user text into a highly specific, \
                      execution-ready AI prompt. Use given context fields (goal, tone, \
                      constraints, output format). Return only the refined prompt.";
        let user = format!(
            "Mode: {mode}\nGoal: {}\nTone: {}\nConstraints: {}\nOutput format: {}\n\nText:\n{text}",
            or_na(&context.goal),
            or_na(&context.tone),
            or_na(&context.constraints),
            or_na(&context.output_format),
        );
        self.complete(system, &user).await
    }

    /// Admin connectivity probe.
    pub async fn probe(&self) -> Result<String> {
        self.complete("Return exactly: OK", "Ping").await
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if self.mock {
            return Ok(format!("[MOCK] {}", truncate(user, 600)));
        }
        if self.api_key.is_empty() {
            return Err(AppError::Internal("OPENAI_API_KEY is not configured".into()));
        }

        let responses_body = json!({
            "model": self.model,
            "input": [
                { "role": "system", "content": [{ "type": "input_text", "text": system }] },
                { "role": "user", "content": [{ "type": "input_text", "text": user }] },
            ],
            "temperature": 0.4,
        });

        let first_error = match self.post("/v1/responses", &responses_body).await {
            Ok(data) => {
                let output = data
                    .get("output_text")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                return Ok(output.trim().to_string());
            }
            Err(e) => e,
        };

        let chat_body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": 0.4,
        });

        match self.post("/v1/chat/completions", &chat_body).await {
            Ok(data) => {
                let output = data
                    .pointer("/choices/0/message/content")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Ok(output.trim().to_string())
            }
            Err(second_error) => Err(AppError::Internal(format!(
                "responses failed: {first_error} | chat completions failed: {second_error}"
            ))),
        }
    }

    async fn post(&self, path: &str, body: &Value) -> std::result::Result<Value, String> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {text}"));
        }

        response.json().await.map_err(|e| e.to_string())
    }
}

/// Deterministic prompt skeleton served when the AI collaborator is
/// unavailable. Empty input produces empty output.
pub fn local_fallback_prompt(text: &str) -> String {
    let raw = text.trim();
    if raw.is_empty() {
        return String::new();
    }
    [
        "You are a practical assistant.",
        "",
        "Task:",
        raw,
        "",
        "Rules:",
        "- Be accurate and concise.",
        "- If critical info is missing, ask only necessary questions.",
        "",
        "Output format:",
        "1) Short answer",
        "2) Actionable steps",
    ]
    .join("\n")
}

fn or_na(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() { "n/a" } else { trimmed }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
