//! Collision detection between the character and the obstacle pair
//!
//! This is a tolerance band test rather than a bounding-box overlap: the pair is
//! only dangerous while its left edge sits inside a fixed horizontal window, and
//! the character is then checked against the two vertical block edges.

use super::state::Obstacle;
use crate::settings::Tuning;

/// Whether the obstacle's left edge is inside the horizontal hit window
#[inline]
pub fn in_hit_window(obstacle_x: f32, tuning: &Tuning) -> bool {
    let start = tuning.obstacle_width;
    obstacle_x >= start && obstacle_x <= start + tuning.hit_window
}

/// Whether the character's top edge lies above the bottom edge of the top block
#[inline]
pub fn hits_top_block(position: f32, obstacle: &Obstacle) -> bool {
    position >= 0.0 && position < obstacle.gap_offset
}

/// Whether the character reaches down past the top edge of the bottom block
#[inline]
pub fn hits_bottom_block(position: f32, obstacle: &Obstacle, field_height: f32, tuning: &Tuning) -> bool {
    let bottom_block = field_height - tuning.gap_height - obstacle.gap_offset;
    let threshold = field_height - bottom_block - tuning.character_height;
    position <= field_height && position >= threshold
}

/// Full collision test between the character at `position` and the obstacle pair
pub fn character_obstacle_collision(
    position: f32,
    obstacle: &Obstacle,
    field_height: f32,
    tuning: &Tuning,
) -> bool {
    in_hit_window(obstacle.x, tuning)
        && (hits_top_block(position, obstacle)
            || hits_bottom_block(position, obstacle, field_height, tuning))
}
