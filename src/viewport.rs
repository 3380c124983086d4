//! Playfield sizing
//!
//! Fits a fixed-ratio playfield into whatever display area the host offers.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Logical playfield size in whole units
///
/// A zero width means no host metrics have been applied yet; nothing that
/// depends on the bounds may run until [`PlayfieldBounds::is_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayfieldBounds {
    pub width: f32,
    pub height: f32,
}

impl PlayfieldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Fit a playfield with `height / width ≈ ratio` into a `host_w × host_h` display.
    ///
    /// Tall displays are filled width-first, wide displays height-first. Degenerate
    /// metrics (zero, negative or non-finite) yield the not-ready zero bounds.
    pub fn fit(host_w: f32, host_h: f32, ratio: f32) -> Self {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(host_w) || !valid(host_h) || !valid(ratio) {
            return Self::default();
        }

        let (width, height) = if host_h / host_w > ratio {
            let width = (host_w * WIDTH_FILL).min(MAX_PLAYFIELD_WIDTH);
            (width, width * ratio)
        } else {
            let height = (host_h * HEIGHT_FILL).min(MAX_PLAYFIELD_HEIGHT);
            (height / ratio, height)
        };

        Self {
            width: width.floor(),
            height: height.floor(),
        }
    }

    /// Whether the bounds are usable for simulation
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
