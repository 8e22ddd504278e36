//! Pocket identifiers, points table and score accumulation

use serde::{Deserialize, Serialize};

use super::constants::{MAX_POCKET_COUNT, POCKET_PREFIX};

/// Index returned for identifiers that do not name a pocket.
///
/// Indistinguishable from the first pocket; callers cannot tell an invalid
/// identifier from `Pocket1` by the index alone.
pub const FALLBACK_POCKET_INDEX: usize = 0;

/// Running score for one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub total_points: i32,
    pub balls_per_pocket: [u32; MAX_POCKET_COUNT],
}

#[derive(Debug, Clone, Default)]
pub struct PocketScoreBoard {
    board: ScoreBoard,
    pocket_points: [i32; MAX_POCKET_COUNT],
}

impl PocketScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score board with a per-pocket points table
    pub fn with_points_table(pocket_points: [i32; MAX_POCKET_COUNT]) -> Self {
        Self {
            board: ScoreBoard::default(),
            pocket_points,
        }
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    pub fn total_points(&self) -> i32 {
        self.board.total_points
    }

    /// 0-based pocket index for an identifier such as `Pocket3`
    pub fn resolve_pocket_index(id: &str) -> usize {
        parse_pocket_index(id)
            .filter(|index| *index < MAX_POCKET_COUNT)
            .unwrap_or(FALLBACK_POCKET_INDEX)
    }

    /// Points awarded for a ball entering pocket `id`
    pub fn points_for_pocket(&self, id: &str) -> i32 {
        self.pocket_points[Self::resolve_pocket_index(id)]
    }

    /// Record a pocketed ball.
    ///
    /// # Panics
    ///
    /// `pocket_number` is 1-based and must already be validated; 0 or
    /// anything above `MAX_POCKET_COUNT` indexes out of bounds.
    pub fn award(&mut self, points: i32, pocket_number: usize) {
        self.board.total_points += points;
        self.board.balls_per_pocket[pocket_number - 1] += 1;
    }
}

/// Numeric suffix minus one, `None` when it does not parse or is below 1
fn parse_pocket_index(id: &str) -> Option<usize> {
    let number: usize = id.strip_prefix(POCKET_PREFIX)?.parse().ok()?;
    number.checked_sub(1)
}
