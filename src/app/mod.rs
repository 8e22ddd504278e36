//! Application wiring: shared state, scene navigation and the session loop

pub mod autoplay;
pub mod scenes;
pub mod session;
pub mod state;

pub use state::AppState;
