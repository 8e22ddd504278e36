//! Telemetry snapshot building

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::constants::MAX_POCKET_COUNT;
use super::scoring::ScoreBoard;
use super::state_machine::{LevelSession, LevelState};

/// Counters kept alongside the level session for analytics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelStats {
    pub shots_taken: u32,
    pub balls_knocked_off: u32,
    pub bullet_collisions: u32,
    /// Simulation seconds since level start
    pub time_taken: f32,
}

/// Flat, immutable record submitted to the telemetry sink.
///
/// The sink overwrites the whole record stored under `level_session_id`, so
/// a late-arriving older snapshot can replace a newer one. `seq` increases
/// with every snapshot of a session and lets readers spot that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub game_session_id: String,
    pub level_session_id: Uuid,
    pub seq: u64,
    pub shots_taken: u32,
    pub balls_per_pocket: [u32; MAX_POCKET_COUNT],
    pub total_points: i32,
    pub remaining_shots: u32,
    pub balls_knocked_off: u32,
    pub bullet_collisions: u32,
    pub time_taken: f32,
    pub current_level: i32,
    pub level_name: String,
    pub level_state: LevelState,
    pub captured_at: DateTime<Utc>,
}

/// Builds snapshots for one level session
pub struct SnapshotBuilder {
    game_session_id: String,
    next_seq: u64,
}

impl SnapshotBuilder {
    pub fn new(game_session_id: impl Into<String>) -> Self {
        Self {
            game_session_id: game_session_id.into(),
            next_seq: 0,
        }
    }

    /// Sequence number the next snapshot will carry
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn build(
        &mut self,
        session: &LevelSession,
        board: &ScoreBoard,
        stats: &LevelStats,
    ) -> TelemetrySnapshot {
        let seq = self.next_seq;
        self.next_seq += 1;

        TelemetrySnapshot {
            game_session_id: self.game_session_id.clone(),
            level_session_id: session.level_session_id,
            seq,
            shots_taken: stats.shots_taken,
            balls_per_pocket: board.balls_per_pocket,
            total_points: board.total_points,
            remaining_shots: session.remaining_shots,
            balls_knocked_off: stats.balls_knocked_off,
            bullet_collisions: stats.bullet_collisions,
            time_taken: stats.time_taken,
            current_level: session.current_level,
            level_name: session.level_name.clone(),
            level_state: session.state,
            captured_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> (LevelSession, ScoreBoard, LevelStats) {
        let mut session = LevelSession::new(2, "Level2", 5);
        session.remaining_shots = 3;
        session.state = LevelState::Completed;

        let mut board = ScoreBoard::default();
        board.total_points = 40;
        board.balls_per_pocket[0] = 1;
        board.balls_per_pocket[7] = 3;

        let stats = LevelStats {
            shots_taken: 2,
            balls_knocked_off: 1,
            bullet_collisions: 4,
            time_taken: 12.345,
        };
        (session, board, stats)
    }

    #[test]
    fn snapshot_projects_session_and_score() {
        let (session, board, stats) = sample_state();
        let mut builder = SnapshotBuilder::new("game-1");

        let snapshot = builder.build(&session, &board, &stats);

        assert_eq!(snapshot.game_session_id, "game-1");
        assert_eq!(snapshot.level_session_id, session.level_session_id);
        assert_eq!(snapshot.total_points, 40);
        assert_eq!(snapshot.balls_per_pocket[7], 3);
        assert_eq!(snapshot.remaining_shots, 3);
        assert_eq!(snapshot.level_state, LevelState::Completed);
        assert_eq!(snapshot.level_name, "Level2");
        assert_eq!(snapshot.current_level, 2);
        assert_eq!(snapshot.shots_taken, 2);
    }

    #[test]
    fn sequence_numbers_increase_per_snapshot() {
        let (session, board, stats) = sample_state();
        let mut builder = SnapshotBuilder::new("game-1");

        let first = builder.build(&session, &board, &stats);
        let second = builder.build(&session, &board, &stats);

        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);
        assert_eq!(builder.next_seq(), 2);
    }

    #[test]
    fn snapshot_survives_json_round_trip() {
        let (session, board, stats) = sample_state();
        let snapshot = SnapshotBuilder::new("game-1").build(&session, &board, &stats);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back, snapshot);
    }

    #[test]
    fn snapshot_serializes_as_flat_record() {
        let (session, board, stats) = sample_state();
        let snapshot = SnapshotBuilder::new("game-1").build(&session, &board, &stats);

        let value = serde_json::to_value(&snapshot).unwrap();
        let record = value.as_object().unwrap();

        assert_eq!(record["level_state"], "Completed");
        assert_eq!(record["balls_per_pocket"].as_array().unwrap().len(), MAX_POCKET_COUNT);
        assert!(record.values().all(|v| !v.is_object()));
    }
}
