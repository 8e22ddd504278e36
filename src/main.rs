//! Echo Pocket - headless gameplay core
//!
//! Runs the shooting game's levels without a renderer:
//! - Charge-and-release shots, each echoed by a ghost on the next shot
//! - Pocket scoring and the win/lose level state machine
//! - Fire-and-forget telemetry to a realtime database

mod app;
mod config;
mod game;
mod telemetry;
mod util;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Echo Pocket");
    info!(levels = ?config.levels, shots = config.shots_per_level, "Session configured");

    let (state, dispatcher) = AppState::new(config)?;
    info!(game_session_id = %state.game_session_id, "Game session created");

    tokio::select! {
        _ = app::session::run(state) => {}
        _ = shutdown_signal() => {}
    }

    // Every telemetry handle is gone now; let pending submissions finish
    dispatcher.await?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping session");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping session");
        }
    }
}
