//! Configuration module - environment variable parsing

use std::env;
use std::time::Duration;

use crate::game::constants::DEFAULT_SHOT_COUNT;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Realtime database base URL; telemetry stays in memory when unset
    pub telemetry_url: Option<String>,
    /// Collection the records are written under
    pub telemetry_path: String,
    /// Per-request timeout for telemetry submissions
    pub telemetry_timeout: Duration,

    /// Game session id shared by every level of this run
    pub game_session_id: Option<String>,
    /// Level scene names, in play order
    pub levels: Vec<String>,
    /// Shots granted per level
    pub shots_per_level: u32,

    /// Seed for the headless autoplay
    pub autoplay_seed: u64,
    /// Balls that must be pocketed to win a level
    pub target_balls: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let levels: Vec<String> = get("LEVELS")
            .unwrap_or_else(|| "Level0,Level1,Level2".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }

        let timeout_ms: u64 = parse_or(&get, "TELEMETRY_TIMEOUT_MS", 5000)?;

        Ok(Self {
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            telemetry_url: get("TELEMETRY_URL").filter(|url| !url.trim().is_empty()),
            telemetry_path: get("TELEMETRY_PATH").unwrap_or_else(|| "analytics_v2".to_string()),
            telemetry_timeout: Duration::from_millis(timeout_ms),

            game_session_id: get("GAME_SESSION_ID").filter(|id| !id.trim().is_empty()),
            levels,
            shots_per_level: parse_or(&get, "SHOTS_PER_LEVEL", DEFAULT_SHOT_COUNT)?,

            autoplay_seed: parse_or(&get, "AUTOPLAY_SEED", 7)?,
            target_balls: parse_or(&get, "TARGET_BALLS", 3)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("LEVELS must name at least one level")]
    NoLevels,
}
