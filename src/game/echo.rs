//! Single-slot echo buffer: each shot replays the previous one as a ghost

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::charge::{ChargeTier, ShotAttempt};
use super::constants::PROJECTILE_LIFETIME;
use super::projectile::{ProjectileArena, ProjectileId, ProjectileKind};

/// Shot waiting for the next fire event to be replayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedEcho {
    pub shot: ShotAttempt,
    pub placeholder: ProjectileId,
}

/// Visual stand-in showing where the ghost will fire from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostActor {
    pub position: Vec3,
    pub aim: Vec2,
    pub charge_tier: ChargeTier,
}

/// Projectiles produced by one `on_fire` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireReport {
    pub real: ProjectileId,
    pub ghost_released: Option<ProjectileId>,
}

#[derive(Debug)]
pub struct EchoReplayBuffer {
    slot: Option<BufferedEcho>,
    stand_in: Option<GhostActor>,
    lifetime: f32,
}

impl EchoReplayBuffer {
    pub fn new() -> Self {
        Self::with_lifetime(PROJECTILE_LIFETIME)
    }

    pub fn with_lifetime(lifetime: f32) -> Self {
        Self {
            slot: None,
            stand_in: None,
            lifetime,
        }
    }

    pub fn slot(&self) -> Option<&BufferedEcho> {
        self.slot.as_ref()
    }

    pub fn stand_in(&self) -> Option<&GhostActor> {
        self.stand_in.as_ref()
    }

    /// Replay the buffered shot (if any), fire `shot`, then buffer `shot`
    /// unless this is the final shot of the level.
    pub fn on_fire(
        &mut self,
        arena: &mut ProjectileArena,
        shot: &ShotAttempt,
        charge_tier: ChargeTier,
        is_final_shot: bool,
    ) -> FireReport {
        // Drain before fill: the released ghost is always the pre-fire occupant
        let ghost_released = self.slot.take().and_then(|echo| {
            if arena.activate(echo.placeholder, echo.shot.velocity, self.lifetime) {
                Some(echo.placeholder)
            } else {
                warn!(placeholder = echo.placeholder.0, "Buffered ghost vanished before replay");
                None
            }
        });

        let real = arena.spawn_active(ProjectileKind::Real, shot.position, shot.velocity, self.lifetime);

        if !is_final_shot {
            let placeholder = arena.spawn_idle_ghost(shot.position);
            self.slot = Some(BufferedEcho {
                shot: shot.as_ghost(),
                placeholder,
            });
            self.stand_in = Some(GhostActor {
                position: shot.position,
                aim: shot.direction,
                charge_tier,
            });
        }

        FireReport {
            real,
            ghost_released,
        }
    }

    /// Tear down the buffered placeholder and the stand-in
    pub fn clear(&mut self, arena: &mut ProjectileArena) {
        if let Some(echo) = self.slot.take() {
            arena.dispose(echo.placeholder);
        }
        self.stand_in = None;
    }
}

impl Default for EchoReplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(x: f32) -> ShotAttempt {
        ShotAttempt {
            is_ghost: false,
            position: Vec3::new(x, 0.0, 0.0),
            direction: Vec2::Y,
            velocity: Vec2::Y * (10.0 + x),
            charge: 1.0,
        }
    }

    #[test]
    fn first_fire_buffers_without_releasing() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();

        let report = echo.on_fire(&mut arena, &shot(1.0), ChargeTier(3), false);

        assert_eq!(report.ghost_released, None);
        let buffered = echo.slot().unwrap();
        assert!(buffered.shot.is_ghost);
        assert_eq!(buffered.shot.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(arena.in_flight(), 1);
        assert_eq!(echo.stand_in().unwrap().charge_tier, ChargeTier(3));
    }

    #[test]
    fn each_fire_after_first_releases_previous_shot() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();
        let mut released = 0;

        for n in 0..6 {
            let current = shot(n as f32);
            let previous = echo.slot().copied();
            let report = echo.on_fire(&mut arena, &current, ChargeTier(0), false);

            match previous {
                Some(prev) => {
                    assert_eq!(report.ghost_released, Some(prev.placeholder));
                    let ghost = arena.get(prev.placeholder).unwrap();
                    assert_eq!(ghost.velocity, prev.shot.velocity);
                    assert!(ghost.collidable);
                    released += 1;
                }
                None => assert_eq!(report.ghost_released, None),
            }

            // Slot always holds the most recent, not yet replayed, shot
            assert_eq!(echo.slot().unwrap().shot, current.as_ghost());
        }

        assert_eq!(released, 5);
    }

    #[test]
    fn final_shot_releases_but_does_not_refill() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();

        echo.on_fire(&mut arena, &shot(1.0), ChargeTier(0), false);
        let stand_in_before = *echo.stand_in().unwrap();
        let report = echo.on_fire(&mut arena, &shot(2.0), ChargeTier(6), true);

        assert!(report.ghost_released.is_some());
        assert!(echo.slot().is_none());
        // No new stand-in was spawned for the final shot
        assert_eq!(*echo.stand_in().unwrap(), stand_in_before);
        assert_eq!(arena.in_flight(), 3);
    }

    #[test]
    fn final_shot_on_empty_buffer_spawns_nothing_extra() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();

        let report = echo.on_fire(&mut arena, &shot(1.0), ChargeTier(0), true);

        assert_eq!(report.ghost_released, None);
        assert!(echo.slot().is_none());
        assert!(echo.stand_in().is_none());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn stand_in_is_replaced_not_accumulated() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();

        echo.on_fire(&mut arena, &shot(1.0), ChargeTier(1), false);
        echo.on_fire(&mut arena, &shot(2.0), ChargeTier(2), false);

        let stand_in = echo.stand_in().unwrap();
        assert_eq!(stand_in.position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(stand_in.charge_tier, ChargeTier(2));
    }

    #[test]
    fn clear_disposes_placeholder_and_stand_in() {
        let mut arena = ProjectileArena::new();
        let mut echo = EchoReplayBuffer::new();
        echo.on_fire(&mut arena, &shot(1.0), ChargeTier(0), false);
        let placeholder = echo.slot().unwrap().placeholder;

        echo.clear(&mut arena);

        assert!(echo.slot().is_none());
        assert!(echo.stand_in().is_none());
        assert!(arena.get(placeholder).is_none());
    }
}
