//! microbot, a transport-agnostic conversation bot
//!
//! A Rust backend implementing a per-chat conversation state machine
//! driven by commands and inline-keyboard button presses.

mod console;
mod dispatcher;
mod flows;
mod keyboard;
mod state_machine;
mod update;

use console::ConsoleTransport;
use dispatcher::{DispatcherConfig, InMemoryStateStore, SessionManager};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "microbot=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = DispatcherConfig::from_env();
    tracing::info!(
        event_capacity = config.event_capacity,
        broadcast_capacity = config.broadcast_capacity,
        "microbot starting"
    );

    let transport = Arc::new(ConsoleTransport::new());
    let manager = Arc::new(SessionManager::new(
        InMemoryStateStore::new(),
        Arc::clone(&transport),
        config,
    ));

    console::run(manager, transport).await?;

    tracing::info!("microbot stopped");
    Ok(())
}
