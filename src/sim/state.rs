//! Simulation state and core types
//!
//! One mutable record owned by the game core; renderers only ever read it.

use serde::{Deserialize, Serialize};

use crate::viewport::PlayfieldBounds;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// No character chosen yet (also entered after every crash)
    #[default]
    SelectingCharacter,
    /// Character chosen, waiting for the first tap
    ReadyToStart,
    /// Active gameplay; the clock ticks only in this phase
    Running,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    /// Hit the top or bottom half of the obstacle pair
    Obstacle,
    /// Fell past the floor
    Floor,
}

/// Something the host may want to react to (sound, HUD flash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A run began
    Started,
    /// Jump impulse applied
    Flapped,
    /// Obstacle pair recycled
    Scored { score: u32 },
    /// Best score raised
    NewHighScore { score: u32 },
    /// Run ended
    Crashed { score: u32, cause: CrashCause },
}

/// The obstacle pair: a top and bottom block around one gap
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge; decreases while running
    pub x: f32,
    /// Top edge of the gap (height of the top block)
    pub gap_offset: f32,
}

impl Obstacle {
    /// Top edge of the bottom block
    #[inline]
    pub fn gap_bottom(&self, gap_height: f32) -> f32 {
        self.gap_offset + gap_height
    }

    /// Height of the bottom block for a playfield of `field_height`
    #[inline]
    pub fn bottom_height(&self, field_height: f32, gap_height: f32) -> f32 {
        (field_height - gap_height - self.gap_offset).max(0.0)
    }
}

/// Complete simulation state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub phase: GamePhase,
    /// Vertical offset of the character's top edge
    pub position: f32,
    /// Signed vertical velocity, positive is downward
    pub velocity: f32,
    /// Visual pitch in degrees
    pub rotation: f32,
    pub obstacle: Obstacle,
    /// Obstacle pairs survived this run
    pub score: u32,
    /// Score of the run that most recently ended
    pub last_score: u32,
    /// Catalog id of the chosen character
    pub selected_character: Option<String>,
}

impl SimulationState {
    pub fn new(bounds: PlayfieldBounds) -> Self {
        let mut state = Self::default();
        state.park(bounds);
        state
    }

    /// Centre the character at rest and move the obstacle to the right edge
    pub fn park(&mut self, bounds: PlayfieldBounds) {
        self.position = bounds.height / 2.0;
        self.velocity = 0.0;
        self.rotation = 0.0;
        self.obstacle.x = bounds.width;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }
}
