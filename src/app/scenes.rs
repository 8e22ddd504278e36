//! Level loading and navigation between levels

use tracing::info;

use crate::game::{LevelConfig, SceneRequest};

/// Owns the level list and decides which level a scene request leads to
pub struct SceneDirector {
    levels: Vec<String>,
    shots_per_level: u32,
    current: usize,
}

impl SceneDirector {
    pub fn new(levels: Vec<String>, shots_per_level: u32) -> Self {
        Self {
            levels,
            shots_per_level,
            current: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Config for the level currently loaded
    pub fn current_level(&self) -> Option<LevelConfig> {
        self.levels.get(self.current).map(|name| {
            LevelConfig::new(self.current as i32, name.clone()).with_shots(self.shots_per_level)
        })
    }

    /// Apply a scene request. `None` means the run is back at the main menu.
    pub fn apply(&mut self, request: SceneRequest) -> Option<LevelConfig> {
        match request {
            SceneRequest::NextLevel => {
                self.current += 1;
                if self.current >= self.levels.len() {
                    info!("Last level finished, returning to main menu");
                    return None;
                }
                self.current_level()
            }
            SceneRequest::ReloadCurrent => self.current_level(),
            SceneRequest::MainMenu => {
                info!("Returning to main menu");
                None
            }
        }
    }
}
