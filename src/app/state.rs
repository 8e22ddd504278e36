//! Application state shared by the session loop

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::telemetry::{
    FirebaseClient, MemorySink, TelemetryDispatcher, TelemetryError, TelemetryHandle, TelemetrySink,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub game_session_id: String,
    pub telemetry: TelemetryHandle,
}

impl AppState {
    /// Build state and spawn the telemetry dispatcher.
    /// The dispatcher finishes once every clone of the state is dropped.
    pub fn new(config: Config) -> Result<(Self, JoinHandle<()>), TelemetryError> {
        let config = Arc::new(config);

        let sink = match FirebaseClient::from_config(&config)? {
            Some(client) => TelemetrySink::Firebase(client),
            None => TelemetrySink::Memory(MemorySink::new()),
        };
        info!(sink = sink.name(), "Telemetry sink ready");

        let (dispatcher, telemetry) = TelemetryDispatcher::spawn(sink);

        let game_session_id = config
            .game_session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok((
            Self {
                config,
                game_session_id,
                telemetry,
            },
            dispatcher,
        ))
    }
}
