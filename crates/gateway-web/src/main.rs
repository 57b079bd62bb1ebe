//! Approval gateway and trigger endpoints for Querydesk.
//!
//! Hosts the signed approve/reject links, the authenticated review and
//! trigger routes, roster administration and the read-only aggregate views
//! the presentation layer consumes.

mod auth;
mod config;
mod error;
mod routes;
mod state;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use chat_api::ChatClient;
use doc_render::DocRenderer;
use mail_notifier::MailNotifier;
use resolver::{BatchRunner, EngineConfig, ResolutionEngine};
use ticket_store::Store;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting gateway server");

    // Connect to the store
    let store = Store::connect(&config.database_url).await?;
    store.migrate().await?;

    // Collaborators
    let chat = Arc::new(ChatClient::from_env()?);
    let notifier = Arc::new(MailNotifier::from_env()?);
    let renderer = Arc::new(DocRenderer::from_env());

    // Resolution engine and batch runner
    let engine_config = EngineConfig::from_env();
    let approval_secret = engine_config.approval_secret.clone();
    let engine = ResolutionEngine::new(
        chat,
        store.clone(),
        Arc::new(store.clone()),
        notifier.clone(),
        renderer,
        engine_config,
    );
    let runner = Arc::new(BatchRunner::new(Arc::new(engine)));

    // Build application state and router
    let state = AppState::new(store, runner, notifier, approval_secret);
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Gateway server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
