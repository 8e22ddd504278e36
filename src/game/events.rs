//! Outbound notifications for the presentation and scene collaborators

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::charge::ChargeTier;
use super::echo::GhostActor;
use super::projectile::ProjectileId;
use super::state_machine::{LevelState, SceneRequest};

/// Input delivered by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShooterInput {
    /// Point the shooter along `direction`
    Aim { direction: Vec2 },
    /// Fire button pressed
    HoldStart,
    /// Fire button still held for `dt` seconds
    HoldTick { dt: f32 },
    /// Fire button released
    Release,
}

/// Events emitted by a level during input handling or a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Aim feedback changed while charging
    ChargeTierChanged { tier: ChargeTier },

    /// Real projectile launched
    ShotFired {
        projectile_id: ProjectileId,
        velocity: Vec2,
        charge: f32,
        is_final_shot: bool,
    },

    /// Previous shot replayed as a ghost
    GhostReleased {
        projectile_id: ProjectileId,
        velocity: Vec2,
    },

    /// Stand-in for the next ghost shot, replacing any previous one
    GhostActorSpawned { actor: GhostActor },

    /// Stand-in removed on level teardown
    GhostActorCleared,

    /// Projectile reached the end of its lifetime
    ProjectileExpired { projectile_id: ProjectileId },

    /// HUD counters changed
    HudChanged { remaining_shots: u32, total_points: i32 },

    /// Level reached a terminal state
    LevelEnded { state: LevelState },

    /// End-of-level text shown
    MessageShown { text: String },

    /// End-of-level text hidden
    MessageHidden,

    /// Scene change for the level-loading collaborator
    Scene { request: SceneRequest },
}
