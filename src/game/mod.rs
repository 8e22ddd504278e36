//! Gameplay core: charging, echo shots, scoring and level completion

pub mod charge;
pub mod constants;
pub mod echo;
pub mod events;
pub mod level;
pub mod projectile;
pub mod scoring;
pub mod snapshot;
pub mod state_machine;

pub use charge::{ChargeController, ChargeTier, ShotAttempt};
pub use echo::EchoReplayBuffer;
pub use events::{GameEvent, ShooterInput};
pub use level::{GameLevel, LevelConfig};
pub use projectile::ProjectileArena;
pub use scoring::{PocketScoreBoard, ScoreBoard};
pub use snapshot::TelemetrySnapshot;
pub use state_machine::{LevelSession, LevelState, LevelStateMachine, SceneRequest};
