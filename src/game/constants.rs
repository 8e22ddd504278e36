//! Gameplay tuning shared by every level

/// Number of pockets a table can have
pub const MAX_POCKET_COUNT: usize = 10;

/// Prefix of pocket identifiers, followed by a 1-based pocket number
pub const POCKET_PREFIX: &str = "Pocket";

/// Shots granted at level start
pub const DEFAULT_SHOT_COUNT: u32 = 5;

/// Seconds before a projectile (real or ghost) is disposed
pub const PROJECTILE_LIFETIME: f32 = 4.0;

/// Delay before judging a level with no shots left as failed
pub const LOSE_CHECK_DELAY: f32 = 1.0;

/// Seconds the win/lose message stays up before the scene changes
pub const WIN_TEXT_DISPLAY_TIME: f32 = 3.0;

pub const WIN_TEXT: &str = "You Win!";
pub const LOSE_TEXT: &str = "You Lose!";
pub const REMAINING_SHOTS_TEXT: &str = "Remaining shots: ";
pub const SCORE_TEXT: &str = "Score: ";

/// Number of discrete charge tiers used for aim feedback
pub const CHARGE_TIERS: u8 = 7;

/// Charge accumulated per second of holding
pub const CHARGE_RATE: f32 = 1.0;
pub const MAX_CHARGE: f32 = 2.0;

/// Projectile speed bounds for a released shot
pub const MIN_SHOT_SPEED: f32 = 10.0;
pub const MAX_SHOT_SPEED: f32 = 50.0;
