use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use prompt_qa_server::ai::AiClient;
use prompt_qa_server::config::Config;
use prompt_qa_server::db::{self, AppState};
use prompt_qa_server::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let pool = db::init_pool(&config.database_path)
        .with_context(|| format!("opening license database at {}", config.database_path))?;
    let ai = AiClient::new(&config)?;
    let addr = config.addr();

    let state = AppState {
        db: pool,
        config: Arc::new(config),
        ai,
    };

    let app = handlers::router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("prompt-qa-copilot-server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
