//! Session telemetry: sinks and the fire-and-forget dispatcher

pub mod dispatcher;
pub mod firebase;
pub mod sink;

pub use dispatcher::{TelemetryDispatcher, TelemetryHandle};
pub use firebase::FirebaseClient;
pub use sink::{MemorySink, TelemetrySink};

/// Telemetry transport errors. Logged by the dispatcher, never surfaced to gameplay.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
}
