//! Fire-and-forget snapshot submission

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::game::TelemetrySnapshot;

use super::sink::TelemetrySink;

/// Sending half held by the simulation. Never blocks, never fails the caller.
#[derive(Clone)]
pub struct TelemetryHandle {
    tx: mpsc::UnboundedSender<TelemetrySnapshot>,
}

impl TelemetryHandle {
    /// Handle plus the raw receiving end, for callers that drain snapshots themselves
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TelemetrySnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn submit(&self, snapshot: TelemetrySnapshot) {
        let seq = snapshot.seq;
        if self.tx.send(snapshot).is_err() {
            warn!(seq, "Telemetry dispatcher closed, snapshot dropped");
        }
    }
}

/// Receives snapshots and submits each one on its own task.
///
/// Submissions for the same session may complete out of order; the sink keeps
/// whichever write lands last.
pub struct TelemetryDispatcher {
    rx: mpsc::UnboundedReceiver<TelemetrySnapshot>,
    sink: TelemetrySink,
}

impl TelemetryDispatcher {
    pub fn new(sink: TelemetrySink) -> (Self, TelemetryHandle) {
        let (handle, rx) = TelemetryHandle::channel();
        (Self { rx, sink }, handle)
    }

    /// Spawn the dispatcher onto the runtime
    pub fn spawn(sink: TelemetrySink) -> (JoinHandle<()>, TelemetryHandle) {
        let (dispatcher, handle) = Self::new(sink);
        (tokio::spawn(dispatcher.run()), handle)
    }

    /// Run until every handle is dropped, then wait for in-flight submissions
    pub async fn run(mut self) {
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(snapshot) => {
                        in_flight.spawn(submit(self.sink.clone(), snapshot));
                    }
                    None => break,
                },
                Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
            }
        }

        while in_flight.join_next().await.is_some() {}
        debug!(sink = self.sink.name(), "Telemetry dispatcher stopped");
    }
}

async fn submit(sink: TelemetrySink, snapshot: TelemetrySnapshot) {
    match sink.submit(&snapshot).await {
        Ok(()) => debug!(
            sink = sink.name(),
            level_session_id = %snapshot.level_session_id,
            seq = snapshot.seq,
            "Telemetry logged"
        ),
        Err(e) => error!(
            sink = sink.name(),
            level_session_id = %snapshot.level_session_id,
            seq = snapshot.seq,
            error = %e,
            "Telemetry submission failed"
        ),
    }
}
