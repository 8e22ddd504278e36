//! Telemetry destinations

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::game::TelemetrySnapshot;

use super::firebase::FirebaseClient;
use super::TelemetryError;

/// In-process store keyed by level session, same overwrite semantics as the database
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<DashMap<Uuid, TelemetrySnapshot>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, snapshot: &TelemetrySnapshot) {
        self.records.insert(snapshot.level_session_id, snapshot.clone());
    }

    pub fn get(&self, level_session_id: &Uuid) -> Option<TelemetrySnapshot> {
        self.records.get(level_session_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where snapshots are submitted
#[derive(Clone)]
pub enum TelemetrySink {
    Firebase(FirebaseClient),
    Memory(MemorySink),
}

impl TelemetrySink {
    /// Upsert the whole snapshot under its level session id
    pub async fn submit(&self, snapshot: &TelemetrySnapshot) -> Result<(), TelemetryError> {
        match self {
            TelemetrySink::Firebase(client) => {
                client
                    .put(&snapshot.level_session_id.to_string(), snapshot)
                    .await
            }
            TelemetrySink::Memory(sink) => {
                sink.put(snapshot);
                Ok(())
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TelemetrySink::Firebase(_) => "firebase",
            TelemetrySink::Memory(_) => "memory",
        }
    }
}
