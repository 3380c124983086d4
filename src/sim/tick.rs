//! Per-frame simulation step
//!
//! Two update streams advance the state once per host frame, each scaled by its
//! own delta-time: the character stream (collision, gravity, pitch, position)
//! and the obstacle stream (scroll and recycle). A crash reported by the
//! character stream ends the frame; the caller must not run the obstacle stream.

use rand::Rng;

use super::collision::character_obstacle_collision;
use super::state::{CrashCause, SimulationState};
use crate::settings::Tuning;
use crate::viewport::PlayfieldBounds;

/// Result of advancing the character stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// State integrated, keep going
    Continue,
    /// Run is over; state was left untouched for this frame
    Crashed(CrashCause),
}

/// Pitch the character eases toward for a given velocity
///
/// Falling pitches down faster (6°/unit) than rising pitches up (4°/unit).
#[inline]
pub fn target_rotation(velocity: f32, tuning: &Tuning) -> f32 {
    if velocity > 0.0 {
        (velocity * crate::consts::FALL_PITCH).min(tuning.max_rotation)
    } else {
        (velocity * crate::consts::RISE_PITCH).max(-tuning.max_rotation)
    }
}

/// Advance the character stream by `dt` reference frames
pub fn step_character(
    state: &mut SimulationState,
    bounds: PlayfieldBounds,
    tuning: &Tuning,
    dt: f32,
) -> StepOutcome {
    // Collision uses last frame's position, before this frame's motion
    if character_obstacle_collision(state.position, &state.obstacle, bounds.height, tuning) {
        return StepOutcome::Crashed(CrashCause::Obstacle);
    }

    let velocity = (state.velocity + tuning.gravity * dt).min(tuning.terminal_velocity);

    let target = target_rotation(velocity, tuning);
    let rotation = (state.rotation + (target - state.rotation) * tuning.rotation_speed)
        .clamp(-tuning.max_rotation, tuning.max_rotation);

    let position = state.position + velocity * dt;
    if position > bounds.height - tuning.character_height {
        return StepOutcome::Crashed(CrashCause::Floor);
    }

    state.velocity = velocity;
    state.rotation = rotation;
    state.position = position.max(0.0);
    StepOutcome::Continue
}

/// Draw a new gap offset uniformly from `[0, height - gap_height)` in whole units
pub fn draw_gap_offset<R: Rng>(rng: &mut R, bounds: PlayfieldBounds, tuning: &Tuning) -> f32 {
    let span = (bounds.height - tuning.gap_height).floor();
    if span < 1.0 {
        return 0.0;
    }
    rng.random_range(0..span as u32) as f32
}

/// Advance the obstacle stream by `dt` reference frames
///
/// Returns true when the pair left the playfield and was recycled, which also
/// scores a point.
pub fn step_obstacle<R: Rng>(
    state: &mut SimulationState,
    bounds: PlayfieldBounds,
    tuning: &Tuning,
    dt: f32,
    rng: &mut R,
) -> bool {
    if state.obstacle.x >= -tuning.obstacle_width {
        state.obstacle.x -= tuning.obstacle_speed * dt;
        return false;
    }

    state.obstacle.x = bounds.width;
    state.obstacle.gap_offset = draw_gap_offset(rng, bounds, tuning);
    state.score += 1;
    true
}
