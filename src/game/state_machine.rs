//! Level completion state machine

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::util::time::Countdown;

use super::constants::{LOSE_CHECK_DELAY, WIN_TEXT_DISPLAY_TIME};

/// Level phase. `Failed` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    InProgress,
    Failed,
    Completed,
}

impl LevelState {
    pub fn is_terminal(self) -> bool {
        self != LevelState::InProgress
    }
}

/// Scene change requested from the level-loading collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneRequest {
    NextLevel,
    MainMenu,
    ReloadCurrent,
}

/// Per-level session state (owned by the state machine)
#[derive(Debug, Clone)]
pub struct LevelSession {
    pub level_session_id: Uuid,
    pub current_level: i32,
    pub level_name: String,
    pub remaining_shots: u32,
    pub balls_moving: u32,
    pub state: LevelState,
}

impl LevelSession {
    pub fn new(current_level: i32, level_name: impl Into<String>, shots: u32) -> Self {
        Self {
            level_session_id: Uuid::new_v4(),
            current_level,
            level_name: level_name.into(),
            remaining_shots: shots,
            balls_moving: 0,
            state: LevelState::InProgress,
        }
    }
}

/// Result of advancing the state machine by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelTick {
    /// Terminal state entered during this tick
    pub entered: Option<LevelState>,
    /// Scene change due after the end-of-level message
    pub scene: Option<SceneRequest>,
}

pub struct LevelStateMachine {
    session: LevelSession,
    failure_check: Option<Countdown>,
    advance: Option<(Countdown, SceneRequest)>,
}

impl LevelStateMachine {
    pub fn new(session: LevelSession) -> Self {
        Self {
            session,
            failure_check: None,
            advance: None,
        }
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    pub fn state(&self) -> LevelState {
        self.session.state
    }

    pub fn remaining_shots(&self) -> u32 {
        self.session.remaining_shots
    }

    pub fn balls_moving(&self) -> u32 {
        self.session.balls_moving
    }

    /// True when the next shot is the last one of the level
    pub fn is_final_shot(&self) -> bool {
        self.session.remaining_shots == 1
    }

    pub fn failure_check_pending(&self) -> bool {
        self.failure_check.is_some()
    }

    pub fn set_balls_moving(&mut self, count: u32) {
        self.session.balls_moving = count;
    }

    /// Spend one shot; with none left and nothing in flight, queue the
    /// deferred failure check instead of failing right away.
    pub fn decrement_shots(&mut self, in_flight: usize) {
        self.session.remaining_shots = self.session.remaining_shots.saturating_sub(1);
        if self.out_of_shots(in_flight) {
            self.schedule_failure_check();
        }
    }

    pub fn tick(&mut self, dt: f32, in_flight: usize) -> LevelTick {
        let mut tick = LevelTick::default();

        if let Some((countdown, request)) = self.advance.as_mut() {
            if countdown.advance(dt) {
                tick.scene = Some(*request);
                self.advance = None;
            }
            return tick;
        }

        if self.out_of_shots(in_flight) && self.failure_check.is_none() {
            self.schedule_failure_check();
        }

        let due = self
            .failure_check
            .as_mut()
            .map_or(false, |countdown| countdown.advance(dt));
        if due {
            self.failure_check = None;
            tick.entered = self.run_failure_check(in_flight);
        }

        tick
    }

    /// Fail the level if it is still running and the table has settled.
    /// Safe to call repeatedly; only the first successful call transitions.
    pub fn run_failure_check(&mut self, in_flight: usize) -> Option<LevelState> {
        if !self.out_of_shots(in_flight) || self.session.balls_moving > 0 {
            debug!(
                level = %self.session.level_name,
                state = ?self.session.state,
                balls_moving = self.session.balls_moving,
                "Failure check skipped"
            );
            return None;
        }
        self.enter_terminal(LevelState::Failed);
        Some(LevelState::Failed)
    }

    /// Win condition reported by the table. Returns false when already terminal.
    pub fn complete(&mut self) -> bool {
        if self.session.state.is_terminal() {
            return false;
        }
        self.enter_terminal(LevelState::Completed);
        true
    }

    /// Put the level back in progress and ask for the scene to be reloaded.
    /// Shots and points are reset by whoever rebuilds the level.
    pub fn restart(&mut self) -> SceneRequest {
        self.session.state = LevelState::InProgress;
        self.failure_check = None;
        self.advance = None;
        info!(level = %self.session.level_name, "Level restarted");
        SceneRequest::ReloadCurrent
    }

    fn out_of_shots(&self, in_flight: usize) -> bool {
        self.session.state == LevelState::InProgress
            && self.session.remaining_shots == 0
            && in_flight == 0
    }

    fn schedule_failure_check(&mut self) {
        self.failure_check = Some(Countdown::new(LOSE_CHECK_DELAY));
    }

    fn enter_terminal(&mut self, state: LevelState) {
        // State first so that any re-entry sees a terminal level
        self.session.state = state;
        self.failure_check = None;

        let request = match state {
            LevelState::Completed => SceneRequest::NextLevel,
            _ => SceneRequest::MainMenu,
        };
        self.advance = Some((Countdown::new(WIN_TEXT_DISPLAY_TIME), request));

        info!(
            level = %self.session.level_name,
            level_session_id = %self.session.level_session_id,
            state = ?state,
            remaining_shots = self.session.remaining_shots,
            "Level finished"
        );
    }
}
