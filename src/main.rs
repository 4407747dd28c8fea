//! HH.gpt - multilingual chat front end
//!
//! Serves a small login-gated chat page. Each message is labelled as
//! English, Urdu or Roman Urdu, steered with a matching system instruction,
//! and answered by a hosted LLM through its OpenAI-compatible API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod language;
mod providers;
mod routes;
mod session;

use config::{Config, PromptSet};
use core::ChatEngine;
use providers::{OpenAICompatConfig, OpenAICompatProvider};
use session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<ChatEngine>,
    pub sessions: SessionStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hh_gpt=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let prompts = match &config.prompts_file {
        Some(path) => {
            let prompts = PromptSet::load_from_file(path).await?;
            tracing::info!("Loaded prompt overrides from {}", path.display());
            prompts
        }
        None => PromptSet::default(),
    };

    let provider = OpenAICompatProvider::new(OpenAICompatConfig::from(&config))?;
    tracing::info!(
        model = provider.model(),
        timeout_secs = config.request_timeout_secs,
        "LLM provider ready"
    );

    let sessions = SessionStore::with_ttl(Duration::from_secs(config.session_ttl_secs));
    let sweep_every = sessions.ttl().min(Duration::from_secs(60));
    sessions.spawn_sweeper(sweep_every);
    tracing::info!(ttl_secs = config.session_ttl_secs, "idle sessions expire");

    let state = AppState {
        chat_engine: Arc::new(ChatEngine::new(prompts, Arc::new(provider))),
        sessions,
    };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("HH.gpt running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
