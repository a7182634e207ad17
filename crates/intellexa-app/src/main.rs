//! Intellexa application binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the conversation engine (registry + producer + controller)
//! 3. Start the axum REST API server
//!
//! The canned producer stands in for a real retrieval backend; wiring a
//! production `ResponseProducer` implementation in here is the single
//! integration point for one.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use intellexa_api::routes;
use intellexa_api::state::AppState;
use intellexa_core::config::AssistantConfig;
use intellexa_engine::{
    CannedProducer, ConversationController, LogNotificationSink, SessionRegistry,
};

mod cli;
use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = AssistantConfig::load_or_default(&config_file);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Intellexa v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Conversation engine.
    let registry = Arc::new(SessionRegistry::new(config.chat.clone()));
    let producer = Arc::new(CannedProducer::with_delay(Duration::from_millis(
        config.chat.producer_delay_ms,
    )));
    let controller = Arc::new(ConversationController::new(
        Arc::clone(&registry),
        producer,
        Arc::new(LogNotificationSink),
        config.chat.clone(),
    ));
    tracing::info!("Conversation engine ready");

    // === API server ===

    let port = args.resolve_port(config.api.port);
    let state = AppState::new(config, controller);

    routes::start_server(port, state).await?;

    Ok(())
}
