//! Seeded autoplay for headless runs.
//!
//! Plays the input collaborator (aim, charge, release) and stands in for the
//! table: balls roll for a while after each shot and sometimes drop into a
//! pocket. No physics is simulated here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::game::{GameEvent, GameLevel, LevelState, ShooterInput};

/// Chance that a shot sends a ball into a pocket
const POCKET_CHANCE: f64 = 0.45;
/// Chance that a released ghost clips the real shot
const GHOST_COLLISION_CHANCE: f64 = 0.2;
/// Chance that a shot knocks a ball off the table
const KNOCK_OFF_CHANCE: f64 = 0.1;
/// Pockets on the autoplay table
const TABLE_POCKETS: u32 = 6;

#[derive(Debug, Clone, Copy)]
enum Phase {
    /// Waiting before the next hold
    Aiming { wait: f32 },
    /// Holding fire until `hold` seconds have passed
    Charging { hold: f32, held: f32 },
    /// Shot released, waiting for the table to settle
    Watching,
}

/// Table activity following a shot
#[derive(Debug, Clone)]
struct Rolling {
    balls: u32,
    settle_in: f32,
    pocket: Option<String>,
}

pub struct Autoplay {
    rng: ChaCha8Rng,
    phase: Phase,
    rolling: Option<Rolling>,
    target_balls: u32,
    pocketed: u32,
}

impl Autoplay {
    pub fn new(seed: u64, target_balls: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: Phase::Aiming { wait: 0.5 },
            rolling: None,
            target_balls,
            pocketed: 0,
        }
    }

    /// Forget table state when a new level is loaded
    pub fn reset(&mut self) {
        self.phase = Phase::Aiming { wait: 0.5 };
        self.rolling = None;
        self.pocketed = 0;
    }

    /// Feed input and table callbacks to the level before its tick
    pub fn drive(&mut self, level: &mut GameLevel, dt: f32) {
        if level.state() != LevelState::InProgress {
            return;
        }

        self.roll_table(level, dt);
        if level.state() != LevelState::InProgress {
            return;
        }

        self.phase = match self.phase {
            Phase::Aiming { wait } => {
                let wait = wait - dt;
                if wait > 0.0 || self.rolling.is_some() || level.projectiles().in_flight() > 0 {
                    Phase::Aiming { wait }
                } else if level.session().remaining_shots == 0 {
                    Phase::Watching
                } else {
                    let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
                    level.handle_input(ShooterInput::Aim {
                        direction: Vec2::from_angle(angle),
                    });
                    level.handle_input(ShooterInput::HoldStart);
                    Phase::Charging {
                        hold: self.rng.gen_range(0.2..2.2),
                        held: 0.0,
                    }
                }
            }
            Phase::Charging { hold, held } => {
                if held >= hold {
                    level.handle_input(ShooterInput::Release);
                    Phase::Watching
                } else {
                    level.handle_input(ShooterInput::HoldTick { dt });
                    Phase::Charging {
                        hold,
                        held: held + dt,
                    }
                }
            }
            Phase::Watching => Phase::Watching,
        };
    }

    /// React to events from the last tick
    pub fn observe(&mut self, level: &mut GameLevel, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::ShotFired { .. } => {
                    let pocket = self
                        .rng
                        .gen_bool(POCKET_CHANCE)
                        .then(|| format!("Pocket{}", self.rng.gen_range(1..=TABLE_POCKETS)));
                    if self.rng.gen_bool(KNOCK_OFF_CHANCE) {
                        level.record_ball_knocked_off();
                    }
                    self.rolling = Some(Rolling {
                        balls: self.rng.gen_range(1..=4),
                        settle_in: self.rng.gen_range(0.5..3.0),
                        pocket,
                    });
                }
                GameEvent::GhostReleased { .. } => {
                    if self.rng.gen_bool(GHOST_COLLISION_CHANCE) {
                        level.record_bullet_collision();
                    }
                }
                GameEvent::ProjectileExpired { .. } => {
                    if matches!(self.phase, Phase::Watching) && level.projectiles().in_flight() == 0 {
                        self.phase = Phase::Aiming {
                            wait: self.rng.gen_range(0.3..1.0),
                        };
                    }
                }
                _ => {}
            }
        }
    }

    fn roll_table(&mut self, level: &mut GameLevel, dt: f32) {
        let Some(rolling) = self.rolling.as_mut() else {
            return;
        };

        rolling.settle_in -= dt;
        if rolling.settle_in > 0.0 {
            level.report_balls_moving(rolling.balls);
            return;
        }

        level.report_balls_moving(0);
        if let Some(pocket) = rolling.pocket.take() {
            let points = level.pocket_ball(&pocket);
            self.pocketed += 1;
            debug!(pocket = %pocket, points, pocketed = self.pocketed, "Ball pocketed");
            if self.pocketed >= self.target_balls {
                level.complete();
            }
        }
        self.rolling = None;
    }
}
