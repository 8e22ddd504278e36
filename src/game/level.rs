//! A single level session: input, shooting, scoring and completion

use glam::{Vec2, Vec3};
use tracing::{debug, info};

use crate::telemetry::TelemetryHandle;

use super::charge::{ChargeController, ChargeSettings};
use super::constants::{DEFAULT_SHOT_COUNT, LOSE_TEXT, MAX_POCKET_COUNT, WIN_TEXT};
use super::echo::EchoReplayBuffer;
use super::events::{GameEvent, ShooterInput};
use super::projectile::ProjectileArena;
use super::scoring::PocketScoreBoard;
use super::snapshot::{LevelStats, SnapshotBuilder};
use super::state_machine::{LevelSession, LevelState, LevelStateMachine, SceneRequest};

/// Static description of a level
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub current_level: i32,
    pub level_name: String,
    pub shots: u32,
    pub pocket_points: [i32; MAX_POCKET_COUNT],
    pub charge: ChargeSettings,
    /// Where the shooter stands
    pub shooter_position: Vec3,
}

impl LevelConfig {
    pub fn new(current_level: i32, level_name: impl Into<String>) -> Self {
        Self {
            current_level,
            level_name: level_name.into(),
            shots: DEFAULT_SHOT_COUNT,
            pocket_points: [10; MAX_POCKET_COUNT],
            charge: ChargeSettings::default(),
            shooter_position: Vec3::ZERO,
        }
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }
}

/// The authoritative level simulation, driven one tick at a time
pub struct GameLevel {
    state: LevelStateMachine,
    charge: ChargeController,
    echo: EchoReplayBuffer,
    arena: ProjectileArena,
    scores: PocketScoreBoard,
    stats: LevelStats,
    snapshot_builder: SnapshotBuilder,
    telemetry: TelemetryHandle,
    shooter_position: Vec3,
    aim: Vec2,
    holding: bool,
    /// Cleared when the level ends, the shooter no longer takes input
    shooter_active: bool,
    message: Option<String>,
    events: Vec<GameEvent>,
}

impl GameLevel {
    pub fn new(config: LevelConfig, game_session_id: &str, telemetry: TelemetryHandle) -> Self {
        let session = LevelSession::new(config.current_level, config.level_name, config.shots);

        info!(
            level = %session.level_name,
            current_level = session.current_level,
            level_session_id = %session.level_session_id,
            shots = session.remaining_shots,
            "Level started"
        );

        let mut level = Self {
            state: LevelStateMachine::new(session),
            charge: ChargeController::new(config.charge),
            echo: EchoReplayBuffer::new(),
            arena: ProjectileArena::new(),
            scores: PocketScoreBoard::with_points_table(config.pocket_points),
            stats: LevelStats::default(),
            snapshot_builder: SnapshotBuilder::new(game_session_id),
            telemetry,
            shooter_position: config.shooter_position,
            aim: Vec2::X,
            holding: false,
            shooter_active: true,
            message: None,
            events: Vec::new(),
        };
        level.push_hud();
        level
    }

    pub fn session(&self) -> &LevelSession {
        self.state.session()
    }

    pub fn state(&self) -> LevelState {
        self.state.state()
    }

    pub fn scores(&self) -> &PocketScoreBoard {
        &self.scores
    }

    pub fn stats(&self) -> &LevelStats {
        &self.stats
    }

    pub fn echo(&self) -> &EchoReplayBuffer {
        &self.echo
    }

    pub fn projectiles(&self) -> &ProjectileArena {
        &self.arena
    }

    pub fn charge(&self) -> &ChargeController {
        &self.charge
    }

    /// End-of-level text currently on screen
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Take events produced since the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Input collaborator
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, input: ShooterInput) {
        if !self.shooter_active || self.state.state().is_terminal() {
            return;
        }

        match input {
            ShooterInput::Aim { direction } => {
                if let Some(direction) = direction.try_normalize() {
                    self.aim = direction;
                }
            }
            ShooterInput::HoldStart => {
                if self.can_charge() {
                    self.holding = true;
                    self.charge.begin_hold();
                }
            }
            ShooterInput::HoldTick { dt } => {
                if self.holding && self.can_charge() {
                    let before = self.charge.tier();
                    let tier = self.charge.on_hold_tick(dt);
                    if tier != before {
                        self.events.push(GameEvent::ChargeTierChanged { tier });
                    }
                }
            }
            ShooterInput::Release => {
                if !self.holding {
                    return;
                }
                self.holding = false;
                if self.can_charge() {
                    self.fire();
                } else {
                    self.charge.cancel();
                }
            }
        }
    }

    /// A new shot may only be charged with nothing in flight and shots left
    fn can_charge(&self) -> bool {
        self.arena.in_flight() == 0 && self.state.remaining_shots() > 0
    }

    fn fire(&mut self) {
        let tier = self.charge.tier();
        let Some(shot) = self.charge.on_release(self.shooter_position, self.aim) else {
            debug!("Released without charge, no shot");
            return;
        };

        let is_final_shot = self.state.is_final_shot();
        self.stats.shots_taken += 1;

        let report = self.echo.on_fire(&mut self.arena, &shot, tier, is_final_shot);

        if let Some(ghost_id) = report.ghost_released {
            if let Some(ghost) = self.arena.get(ghost_id) {
                self.events.push(GameEvent::GhostReleased {
                    projectile_id: ghost_id,
                    velocity: ghost.velocity,
                });
            }
        }

        self.events.push(GameEvent::ShotFired {
            projectile_id: report.real,
            velocity: shot.velocity,
            charge: shot.charge,
            is_final_shot,
        });

        if !is_final_shot {
            if let Some(actor) = self.echo.stand_in() {
                self.events.push(GameEvent::GhostActorSpawned { actor: *actor });
            }
        }

        self.state.decrement_shots(self.arena.in_flight());
        self.push_hud();

        info!(
            level = %self.state.session().level_name,
            shots_taken = self.stats.shots_taken,
            remaining_shots = self.state.remaining_shots(),
            speed = shot.speed(),
            ghost = report.ghost_released.is_some(),
            "Shot fired"
        );

        self.emit_snapshot();
    }

    // ------------------------------------------------------------------
    // Ball / pocket collaborator
    // ------------------------------------------------------------------

    pub fn report_balls_moving(&mut self, count: u32) {
        self.state.set_balls_moving(count);
    }

    /// Credit a pocketed ball. `pocket_number` is 1-based and must be valid.
    pub fn award(&mut self, points: i32, pocket_number: usize) {
        self.scores.award(points, pocket_number);
        self.push_hud();
        debug!(points, pocket_number, total = self.scores.total_points(), "Points awarded");
        self.emit_snapshot();
    }

    /// Resolve a pocket identifier and award its configured points
    pub fn pocket_ball(&mut self, pocket_id: &str) -> i32 {
        let pocket_number = PocketScoreBoard::resolve_pocket_index(pocket_id) + 1;
        let points = self.scores.points_for_pocket(pocket_id);
        self.award(points, pocket_number);
        points
    }

    pub fn record_ball_knocked_off(&mut self) {
        self.stats.balls_knocked_off += 1;
    }

    pub fn record_bullet_collision(&mut self) {
        self.stats.bullet_collisions += 1;
    }

    /// Win condition met on the table
    pub fn complete(&mut self) {
        if self.state.complete() {
            self.on_level_end(LevelState::Completed);
        }
    }

    // ------------------------------------------------------------------
    // Scene collaborator
    // ------------------------------------------------------------------

    pub fn restart(&mut self) {
        let request = self.state.restart();
        self.shooter_active = true;
        self.holding = false;
        self.charge.cancel();
        if self.message.take().is_some() {
            self.events.push(GameEvent::MessageHidden);
        }
        self.emit_snapshot();
        self.events.push(GameEvent::Scene { request });
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the level by `dt` seconds and return every event produced
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.state.state() == LevelState::InProgress {
            self.stats.time_taken += dt;
        }

        for projectile_id in self.arena.tick(dt) {
            self.events.push(GameEvent::ProjectileExpired { projectile_id });
        }

        let outcome = self.state.tick(dt, self.arena.in_flight());
        if let Some(state) = outcome.entered {
            self.on_level_end(state);
        }
        if let Some(request) = outcome.scene {
            self.advance(request);
        }

        self.drain_events()
    }

    fn on_level_end(&mut self, state: LevelState) {
        // The state machine is already terminal here; tear down what is left
        self.shooter_active = false;
        self.holding = false;
        self.charge.cancel();

        let had_stand_in = self.echo.stand_in().is_some();
        self.echo.clear(&mut self.arena);
        if had_stand_in {
            self.events.push(GameEvent::GhostActorCleared);
        }

        self.events.push(GameEvent::LevelEnded { state });
        self.emit_snapshot();

        let text = match state {
            LevelState::Completed => WIN_TEXT,
            _ => LOSE_TEXT,
        };
        self.message = Some(text.to_string());
        self.events.push(GameEvent::MessageShown {
            text: text.to_string(),
        });
    }

    fn advance(&mut self, request: SceneRequest) {
        if self.message.take().is_some() {
            self.events.push(GameEvent::MessageHidden);
        }
        info!(level = %self.state.session().level_name, request = ?request, "Leaving level");
        self.events.push(GameEvent::Scene { request });
    }

    fn push_hud(&mut self) {
        self.events.push(GameEvent::HudChanged {
            remaining_shots: self.state.remaining_shots(),
            total_points: self.scores.total_points(),
        });
    }

    fn emit_snapshot(&mut self) {
        let snapshot = self
            .snapshot_builder
            .build(self.state.session(), self.scores.board(), &self.stats);
        self.telemetry.submit(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::{PROJECTILE_LIFETIME, WIN_TEXT_DISPLAY_TIME};
    use crate::game::TelemetrySnapshot;
    use tokio::sync::mpsc::UnboundedReceiver;

    const DT: f32 = 0.1;

    fn level(shots: u32) -> (GameLevel, UnboundedReceiver<TelemetrySnapshot>) {
        let (telemetry, rx) = TelemetryHandle::channel();
        let config = LevelConfig::new(0, "Level0").with_shots(shots);
        (GameLevel::new(config, "game-session", telemetry), rx)
    }

    fn snapshots(rx: &mut UnboundedReceiver<TelemetrySnapshot>) -> Vec<TelemetrySnapshot> {
        let mut out = Vec::new();
        while let Ok(snapshot) = rx.try_recv() {
            out.push(snapshot);
        }
        out
    }

    fn shoot(level: &mut GameLevel, held: f32) {
        level.handle_input(ShooterInput::Aim { direction: Vec2::Y });
        level.handle_input(ShooterInput::HoldStart);
        level.handle_input(ShooterInput::HoldTick { dt: held });
        level.handle_input(ShooterInput::Release);
    }

    fn run_for(level: &mut GameLevel, seconds: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < seconds {
            events.extend(level.tick(DT));
            elapsed += DT;
        }
        events
    }

    #[test]
    fn shot_spends_charge_and_emits_snapshot() {
        let (mut level, mut rx) = level(5);
        level.drain_events();

        shoot(&mut level, 1.0);

        let events = level.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShotFired { is_final_shot: false, .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GhostActorSpawned { .. })));
        assert_eq!(level.session().remaining_shots, 4);
        assert_eq!(level.stats().shots_taken, 1);
        assert_eq!(level.charge().charge(), 0.0);

        let sent = snapshots(&mut rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].shots_taken, 1);
        assert_eq!(sent[0].remaining_shots, 4);
    }

    #[test]
    fn charging_is_ignored_while_projectile_in_flight() {
        let (mut level, mut rx) = level(5);
        shoot(&mut level, 1.0);
        assert_eq!(level.projectiles().in_flight(), 1);

        level.handle_input(ShooterInput::HoldStart);
        level.handle_input(ShooterInput::HoldTick { dt: 1.0 });
        assert_eq!(level.charge().charge(), 0.0);
        level.handle_input(ShooterInput::Release);

        assert_eq!(level.session().remaining_shots, 4);
        assert_eq!(snapshots(&mut rx).len(), 1);
    }

    #[test]
    fn stray_click_without_charge_fires_nothing() {
        let (mut level, mut rx) = level(5);
        level.handle_input(ShooterInput::HoldStart);
        level.handle_input(ShooterInput::Release);

        assert_eq!(level.session().remaining_shots, 5);
        assert!(snapshots(&mut rx).is_empty());
    }

    #[test]
    fn second_shot_releases_ghost_of_first() {
        let (mut level, _rx) = level(5);
        shoot(&mut level, 2.0);
        let first_velocity = level.echo().slot().unwrap().shot.velocity;
        run_for(&mut level, PROJECTILE_LIFETIME + DT);
        level.drain_events();

        shoot(&mut level, 0.5);

        let events = level.drain_events();
        let released = events.iter().find_map(|e| match e {
            GameEvent::GhostReleased { velocity, .. } => Some(*velocity),
            _ => None,
        });
        assert_eq!(released, Some(first_velocity));
        assert_eq!(level.projectiles().in_flight(), 2);
    }

    #[test]
    fn final_shot_does_not_buffer_a_ghost() {
        let (mut level, _rx) = level(1);
        level.drain_events();

        shoot(&mut level, 1.0);

        let events = level.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShotFired { is_final_shot: true, .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GhostActorSpawned { .. })));
        assert!(level.echo().slot().is_none());
    }

    #[test]
    fn running_out_of_shots_fails_once_and_returns_to_menu() {
        let (mut level, mut rx) = level(5);
        let mut events = Vec::new();

        for _ in 0..5 {
            shoot(&mut level, 1.0);
            events.extend(run_for(&mut level, PROJECTILE_LIFETIME + DT));
        }
        events.extend(run_for(&mut level, 2.0 + WIN_TEXT_DISPLAY_TIME));

        assert_eq!(level.state(), LevelState::Failed);
        let ended = events.iter().filter(|e| matches!(e, GameEvent::LevelEnded { .. })).count();
        assert_eq!(ended, 1);
        assert!(events.contains(&GameEvent::MessageShown { text: LOSE_TEXT.to_string() }));
        assert!(events.contains(&GameEvent::Scene { request: SceneRequest::MainMenu }));
        assert!(level.message().is_none());

        // Transient ghost actors are torn down
        assert!(level.echo().slot().is_none());
        assert!(level.echo().stand_in().is_none());

        let sent = snapshots(&mut rx);
        assert_eq!(sent.len(), 6);
        assert_eq!(sent.last().unwrap().level_state, LevelState::Failed);
        assert!(sent.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[test]
    fn failure_waits_for_balls_to_settle() {
        let (mut level, _rx) = level(1);
        shoot(&mut level, 1.0);
        level.report_balls_moving(3);

        run_for(&mut level, PROJECTILE_LIFETIME + 3.0);
        assert_eq!(level.state(), LevelState::InProgress);

        level.report_balls_moving(0);
        run_for(&mut level, 1.5);
        assert_eq!(level.state(), LevelState::Failed);
    }

    #[test]
    fn complete_after_failure_has_no_side_effects() {
        let (mut level, mut rx) = level(1);
        shoot(&mut level, 1.0);
        run_for(&mut level, PROJECTILE_LIFETIME + 1.5);
        assert_eq!(level.state(), LevelState::Failed);
        snapshots(&mut rx);
        level.drain_events();

        level.complete();

        assert_eq!(level.state(), LevelState::Failed);
        assert!(snapshots(&mut rx).is_empty());
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn completion_shows_win_text_and_advances() {
        let (mut level, mut rx) = level(5);
        shoot(&mut level, 1.0);
        level.complete();
        level.complete();

        assert_eq!(level.state(), LevelState::Completed);
        assert_eq!(level.message(), Some(WIN_TEXT));

        // No more shots once the level is over
        let mut events = run_for(&mut level, PROJECTILE_LIFETIME + DT);
        shoot(&mut level, 1.0);
        assert_eq!(level.session().remaining_shots, 4);

        events.extend(run_for(&mut level, WIN_TEXT_DISPLAY_TIME));
        let scenes = events.iter().filter(|e| matches!(e, GameEvent::Scene { .. })).count();
        assert_eq!(scenes, 1);
        assert!(events.contains(&GameEvent::Scene { request: SceneRequest::NextLevel }));
        assert!(level.message().is_none());

        let sent = snapshots(&mut rx);
        let terminal: Vec<_> = sent.iter().filter(|s| s.level_state == LevelState::Completed).collect();
        assert_eq!(terminal.len(), 1);
    }

    #[test]
    fn pocketing_awards_points_and_snapshots() {
        let (mut level, mut rx) = level(5);

        assert_eq!(level.pocket_ball("Pocket3"), 10);
        level.pocket_ball("Pocket3");
        level.award(25, 10);

        assert_eq!(level.scores().total_points(), 45);
        assert_eq!(level.scores().board().balls_per_pocket[2], 2);
        assert_eq!(level.scores().board().balls_per_pocket[9], 1);

        let sent = snapshots(&mut rx);
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].total_points, 45);
    }

    #[test]
    fn malformed_pocket_credits_first_pocket() {
        let (mut level, _rx) = level(5);
        level.pocket_ball("Pocket99");
        assert_eq!(level.scores().board().balls_per_pocket[0], 1);
    }

    #[test]
    fn restart_requests_reload_and_keeps_counters() {
        let (mut level, mut rx) = level(2);
        shoot(&mut level, 1.0);
        level.pocket_ball("Pocket1");
        level.complete();
        snapshots(&mut rx);
        level.drain_events();

        level.restart();

        assert_eq!(level.state(), LevelState::InProgress);
        assert_eq!(level.session().remaining_shots, 1);
        assert_eq!(level.scores().total_points(), 10);
        let events = level.drain_events();
        assert!(events.contains(&GameEvent::MessageHidden));
        assert!(events.contains(&GameEvent::Scene { request: SceneRequest::ReloadCurrent }));

        let sent = snapshots(&mut rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].level_state, LevelState::InProgress);
    }
}
