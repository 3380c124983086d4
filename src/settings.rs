//! Game settings and tuning
//!
//! Read once at startup and never mutated afterwards. On the web the JSON lives
//! in LocalStorage; native builds read a file named by `FLAPPY_SETTINGS`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a settings document was rejected
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Physics and geometry tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Downward acceleration per reference frame
    pub gravity: f32,
    /// Fall speed cap
    pub terminal_velocity: f32,
    /// Velocity set by a tap (negative is upward)
    pub jump_force: f32,
    /// Pitch limit in degrees
    pub max_rotation: f32,
    /// Fraction of the remaining pitch error closed each frame
    pub rotation_speed: f32,
    /// Obstacle scroll speed per reference frame
    pub obstacle_speed: f32,
    pub obstacle_width: f32,
    pub gap_height: f32,
    pub character_width: f32,
    pub character_height: f32,
    /// Width of the collision band, starting at `obstacle_width`
    pub hit_window: f32,
}

impl Tuning {
    /// Check that every value keeps the simulation well defined
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks = [
            ("gravity", self.gravity, self.gravity.is_finite()),
            (
                "terminal_velocity",
                self.terminal_velocity,
                self.terminal_velocity.is_finite(),
            ),
            ("jump_force", self.jump_force, self.jump_force.is_finite()),
            ("max_rotation", self.max_rotation, self.max_rotation >= 0.0),
            (
                "rotation_speed",
                self.rotation_speed,
                (0.0..=1.0).contains(&self.rotation_speed),
            ),
            (
                "obstacle_speed",
                self.obstacle_speed,
                self.obstacle_speed.is_finite(),
            ),
            ("obstacle_width", self.obstacle_width, self.obstacle_width > 0.0),
            ("gap_height", self.gap_height, self.gap_height > 0.0),
            (
                "character_width",
                self.character_width,
                self.character_width > 0.0,
            ),
            (
                "character_height",
                self.character_height,
                self.character_height > 0.0,
            ),
            ("hit_window", self.hit_window, self.hit_window >= 0.0),
        ];
        for (field, value, ok) in checks {
            // NaN fails every comparison, infinity is caught here
            if !ok || !value.is_finite() {
                return Err(SettingsError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            terminal_velocity: TERMINAL_VELOCITY,
            jump_force: JUMP_FORCE,
            max_rotation: MAX_ROTATION,
            rotation_speed: ROTATION_SPEED,
            obstacle_speed: OBJ_SPEED,
            obstacle_width: OBJ_WIDTH,
            gap_height: OBJ_GAP,
            character_width: CHARACTER_WIDTH,
            character_height: CHARACTER_HEIGHT,
            hit_window: HIT_WINDOW,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    /// Playfield height / width
    pub aspect_ratio: f32,
    /// Every character is selectable regardless of the best score
    pub show_all_characters: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            aspect_ratio: GAME_RATIO,
            show_all_characters: false,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_web_settings";

    /// Environment variable naming a settings file (native only)
    #[allow(dead_code)]
    const ENV_PATH: &'static str = "FLAPPY_SETTINGS";

    /// Parse and validate settings JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(SettingsError::OutOfRange {
                field: "aspect_ratio",
                value: self.aspect_ratio,
            });
        }
        self.tuning.validate()
    }

    /// These settings if valid, otherwise the defaults
    pub fn validated(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                log::warn!("Ignoring invalid settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring invalid stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from the file named by `FLAPPY_SETTINGS` (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings in {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read settings from {}: {}", path, e);
                Self::default()
            }
        }
    }
}
