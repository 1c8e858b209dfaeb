//! Farpost server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `farpost-config.yaml` (or `FARPOST_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the shared application state
//! 4. Start the extraction timer poller
//! 5. Serve the HTTP API

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use farpost_core::{GameConfig, SystemClock};
use farpost_server::{AppState, spawn_timer_poller, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default config path, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "farpost-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is unusable or the server fails to
/// bind or serve.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging is configured from the file, so load it first.
    let config_path = std::env::var("FARPOST_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = GameConfig::load_or_default(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        path = %config_path.display(),
        version = config.version,
        resources = config.economy.resources.len(),
        boosters = config.economy.boosters.len(),
        speed_multiplier = config.session.speed_multiplier,
        "Configuration loaded"
    );

    let server_config = config.server.clone();
    let state = Arc::new(AppState::new(config, Arc::new(SystemClock))?);

    let poller = spawn_timer_poller(
        Arc::clone(&state),
        Duration::from_millis(server_config.timer_poll_ms),
    );
    info!(interval_ms = server_config.timer_poll_ms, "Timer poller started");

    let result = start_server(&server_config, state).await;
    poller.abort();
    result?;

    info!("farpost-server stopped");
    Ok(())
}
