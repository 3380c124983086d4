//! Flappy Web - a single-screen flappy arcade game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (physics, obstacle motion, collision)
//! - `game`: Phase state machine driving the simulation from user input
//! - `clock`: Frame clock producing normalized delta-times
//! - `viewport`: Playfield sizing from host display metrics
//! - `catalog`: Character skins and their unlock thresholds
//! - `highscore`: Best-score tracking and persistence boundary
//! - `settings`: Data-driven tuning, loaded once at startup
//! - `render`: Read-only frame snapshot for an external renderer

pub mod catalog;
pub mod clock;
pub mod game;
pub mod highscore;
pub mod render;
pub mod settings;
pub mod sim;
pub mod viewport;

pub use catalog::{CharacterCatalog, CharacterDescriptor};
pub use game::{ActivateOutcome, Game, SelectOutcome};
pub use highscore::HighScore;
pub use settings::{Settings, SettingsError, Tuning};
pub use viewport::PlayfieldBounds;

/// Game configuration constants
pub mod consts {
    /// Reference frame rate the delta-time is normalized to
    pub const REFERENCE_FPS: f64 = 60.0;
    /// Milliseconds per reference frame
    pub const REFERENCE_FRAME_MS: f64 = 1000.0 / REFERENCE_FPS;

    /// Playfield height / width target
    pub const GAME_RATIO: f32 = 1.75;
    /// Width cap and share of the host width used for tall viewports
    pub const MAX_PLAYFIELD_WIDTH: f32 = 400.0;
    pub const WIDTH_FILL: f32 = 0.95;
    /// Height cap and share of the host height used for wide viewports
    pub const MAX_PLAYFIELD_HEIGHT: f32 = 600.0;
    pub const HEIGHT_FILL: f32 = 0.8;

    /// Character sprite size
    pub const CHARACTER_WIDTH: f32 = 50.0;
    pub const CHARACTER_HEIGHT: f32 = 52.0;
    /// Horizontal screen position the character is drawn at
    pub const CHARACTER_X: f32 = 100.0;

    /// Physics defaults
    pub const GRAVITY: f32 = 0.5;
    pub const TERMINAL_VELOCITY: f32 = 12.0;
    pub const JUMP_FORCE: f32 = -8.0;
    /// Degrees
    pub const MAX_ROTATION: f32 = 45.0;
    pub const ROTATION_SPEED: f32 = 0.2;
    /// Rotation per unit of velocity when falling / rising
    pub const FALL_PITCH: f32 = 6.0;
    pub const RISE_PITCH: f32 = 4.0;

    /// Obstacle defaults
    pub const OBJ_SPEED: f32 = 4.0;
    pub const OBJ_WIDTH: f32 = 52.0;
    pub const OBJ_GAP: f32 = 200.0;
    /// Width of the collision band starting at the obstacle width
    pub const HIT_WINDOW: f32 = 80.0;
}
