//! Simulation module
//!
//! All gameplay arithmetic lives here. This module must stay free of platform
//! and rendering concerns:
//! - Variable timestep, one integration per host frame
//! - Randomness only through a caller-supplied RNG
//! - No logging on the per-frame path

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::character_obstacle_collision;
pub use state::{CrashCause, GameEvent, GamePhase, Obstacle, SimulationState};
pub use tick::{StepOutcome, draw_gap_offset, step_character, step_obstacle, target_rotation};
