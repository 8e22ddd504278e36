//! Headless session loop: one level at a time at a fixed tick rate

use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::game::constants::{REMAINING_SHOTS_TEXT, SCORE_TEXT};
use crate::game::{GameEvent, GameLevel, LevelConfig};
use crate::util::time::{tick_delta, tick_duration};

use super::autoplay::Autoplay;
use super::scenes::SceneDirector;
use super::AppState;

/// Play every configured level until the run returns to the main menu
pub async fn run(state: AppState) {
    let config = state.config.clone();
    let mut scenes = SceneDirector::new(config.levels.clone(), config.shots_per_level);
    let mut autoplay = Autoplay::new(config.autoplay_seed, config.target_balls);

    let Some(first) = scenes.current_level() else {
        warn!("No levels configured");
        return;
    };
    let mut level = load_level(&state, first);

    let mut ticker = interval(tick_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let dt = tick_delta();

    loop {
        ticker.tick().await;

        autoplay.drive(&mut level, dt);
        let events = level.tick(dt);
        autoplay.observe(&mut level, &events);

        let mut request = None;
        for event in &events {
            match event {
                GameEvent::HudChanged {
                    remaining_shots,
                    total_points,
                } => info!(
                    "{}{} | {}{}",
                    REMAINING_SHOTS_TEXT, remaining_shots, SCORE_TEXT, total_points
                ),
                GameEvent::MessageShown { text } => info!(message = %text, "Level message"),
                GameEvent::Scene { request: r } => request = Some(*r),
                _ => {}
            }
        }

        if let Some(request) = request {
            match scenes.apply(request) {
                Some(config) => {
                    level = load_level(&state, config);
                    autoplay.reset();
                }
                None => break,
            }
        }
    }

    info!(game_session_id = %state.game_session_id, "Session finished");
}

fn load_level(state: &AppState, config: LevelConfig) -> GameLevel {
    GameLevel::new(config, &state.game_session_id, state.telemetry.clone())
}
