mod builder;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod parsing;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::builder::store::SessionStore;
use crate::config::Config;
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::parsing::parser::ResumeParser;
use crate::routes::build_router;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Completion provider is optional: without a key every résumé goes through
    // the heuristic builder.
    let provider: Option<Arc<dyn CompletionProvider>> = match &config.openrouter_api_key {
        Some(key) => {
            let client: Arc<dyn CompletionProvider> = Arc::new(LlmClient::new(
                key.clone(),
                config.ai_api_url.clone(),
                Duration::from_secs(config.ai_timeout_secs),
            )?);
            info!(
                "LLM client initialized (model: {}, endpoint: {})",
                llm_client::MODEL,
                config.ai_api_url
            );
            Some(client)
        }
        None => {
            warn!("OPENROUTER_API_KEY not set, resume parsing will use the heuristic builder");
            None
        }
    };

    let sessions = SessionStore::new();
    sessions.spawn_idle_sweeper(
        Duration::from_secs(config.session_idle_ttl_secs),
        SESSION_SWEEP_INTERVAL,
    );
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_ttl_secs
    );

    let state = AppState {
        parser: Arc::new(ResumeParser::new(provider)),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
