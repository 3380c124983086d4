//! Frame clock
//!
//! Variable-timestep clock: every host frame integrates exactly once, scaled by a
//! delta-time normalized to 60 updates per second. Character physics and obstacle
//! motion keep independent timestamps, so each stream measures its own delta.
//!
//! The clock never calls back into the host. The host asks it whether to keep
//! scheduling (`is_running`) and tags every frame request with the current
//! epoch. Stopping bumps the epoch, which is the whole cancellation mechanism:
//! a frame that was already scheduled arrives with an old epoch and is dropped.

use crate::consts::REFERENCE_FRAME_MS;

/// One independently timed update stream
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStream {
    last_frame: f64,
}

impl FrameStream {
    pub fn new(now: f64) -> Self {
        Self { last_frame: now }
    }

    /// Delta since the previous frame in reference frames (1.0 = one 60 Hz frame)
    ///
    /// Timestamps that run backwards yield 0 rather than a negative step.
    pub fn delta(&mut self, now: f64) -> f32 {
        let elapsed = (now - self.last_frame).max(0.0);
        self.last_frame = now;
        (elapsed / REFERENCE_FRAME_MS) as f32
    }
}

/// Start/stop state of the simulation clock
#[derive(Debug, Default)]
pub struct SimulationClock {
    running: bool,
    epoch: u64,
    character: FrameStream,
    obstacle: FrameStream,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking from `now`; returns the epoch new frames must carry
    pub fn start(&mut self, now: f64) -> u64 {
        self.epoch += 1;
        self.running = true;
        self.character = FrameStream::new(now);
        self.obstacle = FrameStream::new(now);
        self.epoch
    }

    /// Stop ticking; frames already scheduled become stale
    pub fn stop(&mut self) {
        self.running = false;
        self.epoch += 1;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a frame scheduled under `epoch` may still mutate state
    #[inline]
    pub fn accepts(&self, epoch: u64) -> bool {
        self.running && epoch == self.epoch
    }

    /// Measure the character stream delta
    pub fn character_delta(&mut self, now: f64) -> f32 {
        self.character.delta(now)
    }

    /// Measure the obstacle stream delta
    pub fn obstacle_delta(&mut self, now: f64) -> f32 {
        self.obstacle.delta(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_normalized_to_60hz() {
        let mut stream = FrameStream::new(1000.0);
        let dt = stream.delta(1000.0 + REFERENCE_FRAME_MS);
        assert!((dt - 1.0).abs() < 1e-5);

        // A 30 Hz host frame counts double
        let dt = stream.delta(1000.0 + 3.0 * REFERENCE_FRAME_MS);
        assert!((dt - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut stream = FrameStream::new(500.0);
        assert_eq!(stream.delta(400.0), 0.0);
    }

    #[test]
    fn test_streams_are_independent() {
        let mut clock = SimulationClock::new();
        clock.start(0.0);
        let dt = clock.character_delta(REFERENCE_FRAME_MS);
        assert!((dt - 1.0).abs() < 1e-5);
        // Obstacle stream has not been sampled yet, so it covers both frames
        let dt = clock.obstacle_delta(2.0 * REFERENCE_FRAME_MS);
        assert!((dt - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_stop_invalidates_epoch() {
        let mut clock = SimulationClock::new();
        let epoch = clock.start(0.0);
        assert!(clock.accepts(epoch));

        clock.stop();
        assert!(!clock.is_running());
        assert!(!clock.accepts(epoch));
        assert_ne!(clock.epoch(), epoch);
    }

    #[test]
    fn test_restart_rejects_old_epoch() {
        let mut clock = SimulationClock::new();
        let old = clock.start(0.0);
        clock.stop();
        let new = clock.start(100.0);
        assert_ne!(old, new);
        assert!(!clock.accepts(old));
        assert!(clock.accepts(new));
    }
}
