//! Game phase state machine
//!
//! `SelectingCharacter → ReadyToStart → Running → SelectingCharacter`.
//!
//! Input handlers and frame callbacks all funnel through [`Game`], which is the
//! only writer of the simulation state. Everything runs on one thread, so a frame
//! and an input event can never interleave.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::catalog::{CharacterCatalog, CharacterDescriptor};
use crate::clock::SimulationClock;
use crate::highscore::{HighScore, ScoreStore};
use crate::settings::{Settings, Tuning};
use crate::sim::{
    CrashCause, GameEvent, GamePhase, SimulationState, StepOutcome, draw_gap_offset,
    step_character, step_obstacle,
};
use crate::viewport::PlayfieldBounds;

/// Result of a character selection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Character chosen, ready to start
    Selected,
    /// Same character was already chosen
    Unchanged,
    /// Best score is below the character's threshold
    Locked,
    UnknownCharacter,
    /// Selection is closed while a run is in progress
    Busy,
}

/// Result of a tap/click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateOutcome {
    /// A run began; frames must carry this clock epoch
    Started { epoch: u64 },
    /// Jump impulse applied
    Flapped,
    /// No character chosen yet
    Ignored,
    /// Playfield has no size yet, the clock was not started
    NotReady,
}

/// The game core
pub struct Game {
    state: SimulationState,
    bounds: PlayfieldBounds,
    settings: Settings,
    catalog: CharacterCatalog,
    high_score: HighScore,
    clock: SimulationClock,
    rng: Pcg32,
    events: Vec<GameEvent>,
    /// Whether `NewHighScore` was already announced this run
    announced_high_score: bool,
}

impl Game {
    pub fn new(
        settings: Settings,
        catalog: CharacterCatalog,
        store: Box<dyn ScoreStore>,
        seed: u64,
    ) -> Self {
        Self {
            state: SimulationState::default(),
            bounds: PlayfieldBounds::default(),
            settings: settings.validated(),
            catalog,
            high_score: HighScore::load(store),
            clock: SimulationClock::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            announced_high_score: false,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn bounds(&self) -> PlayfieldBounds {
        self.bounds
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.settings.tuning
    }

    pub fn catalog(&self) -> &CharacterCatalog {
        &self.catalog
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Descriptor of the chosen character
    pub fn selected_character(&self) -> Option<&CharacterDescriptor> {
        self.state
            .selected_character
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    /// Whether `character` can currently be chosen
    pub fn is_selectable(&self, character: &CharacterDescriptor) -> bool {
        self.settings.show_all_characters || character.is_unlocked(self.high_score.best())
    }

    /// Take the events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply new host display metrics
    ///
    /// When the playfield size changes outside a run, the character is re-centred
    /// and the obstacle parked at the new right edge with a fresh gap.
    pub fn resize(&mut self, host_width: f32, host_height: f32) {
        let bounds = PlayfieldBounds::fit(host_width, host_height, self.settings.aspect_ratio);
        if bounds == self.bounds {
            return;
        }
        log::debug!(
            "Playfield {}x{} (host {}x{})",
            bounds.width,
            bounds.height,
            host_width,
            host_height
        );
        self.bounds = bounds;

        if !self.state.is_running() && bounds.is_ready() {
            self.state.park(bounds);
            self.state.obstacle.gap_offset =
                draw_gap_offset(&mut self.rng, bounds, &self.settings.tuning);
        }
    }

    /// Choose a character (`onCharacterChosen`)
    pub fn select_character(&mut self, id: &str) -> SelectOutcome {
        if self.state.is_running() {
            return SelectOutcome::Busy;
        }
        let Some(character) = self.catalog.get(id) else {
            log::warn!("Unknown character {:?}", id);
            return SelectOutcome::UnknownCharacter;
        };
        if !self.is_selectable(character) {
            log::debug!(
                "Character {:?} locked until score {} (best {})",
                id,
                character.unlock_score,
                self.high_score.best()
            );
            return SelectOutcome::Locked;
        }
        if self.state.phase == GamePhase::ReadyToStart
            && self.state.selected_character.as_deref() == Some(id)
        {
            return SelectOutcome::Unchanged;
        }

        log::info!("Selected {}", character.display_name);
        self.state.selected_character = Some(character.id.clone());
        self.state.phase = GamePhase::ReadyToStart;
        SelectOutcome::Selected
    }

    /// Tap/click (`onActivate`): start a run, or flap during one
    pub fn activate(&mut self, now: f64) -> ActivateOutcome {
        match self.state.phase {
            GamePhase::SelectingCharacter => ActivateOutcome::Ignored,
            GamePhase::ReadyToStart => {
                if !self.bounds.is_ready() {
                    log::warn!("Playfield not sized yet, not starting");
                    return ActivateOutcome::NotReady;
                }
                self.state.phase = GamePhase::Running;
                self.state.velocity = 0.0;
                self.state.rotation = 0.0;
                self.state.position = self.bounds.height / 2.0;
                self.announced_high_score = false;

                let epoch = self.clock.start(now);
                self.events.push(GameEvent::Started);
                log::info!("Run started (best {})", self.high_score.best());
                ActivateOutcome::Started { epoch }
            }
            GamePhase::Running => {
                let tuning = &self.settings.tuning;
                self.state.velocity = tuning.jump_force;
                self.state.rotation = -tuning.max_rotation;
                self.events.push(GameEvent::Flapped);
                ActivateOutcome::Flapped
            }
        }
    }

    /// Run one frame scheduled under `epoch`
    ///
    /// Returns whether the host should schedule another frame. Stale frames from
    /// a previous run are dropped without touching state.
    pub fn frame(&mut self, now: f64, epoch: u64) -> bool {
        if !self.clock.accepts(epoch) || !self.state.is_running() {
            return false;
        }
        if !self.bounds.is_ready() {
            // Keep both streams current so the next sized frame gets a normal step
            self.clock.character_delta(now);
            self.clock.obstacle_delta(now);
            return true;
        }

        let dt = self.clock.character_delta(now);
        if let StepOutcome::Crashed(cause) =
            step_character(&mut self.state, self.bounds, &self.settings.tuning, dt)
        {
            self.reset(cause);
            return false;
        }

        let dt = self.clock.obstacle_delta(now);
        if step_obstacle(
            &mut self.state,
            self.bounds,
            &self.settings.tuning,
            dt,
            &mut self.rng,
        ) {
            let score = self.state.score;
            log::debug!("Obstacle recycled, score {}", score);
            self.events.push(GameEvent::Scored { score });
            if self.high_score.record(score) && !self.announced_high_score {
                self.announced_high_score = true;
                self.events.push(GameEvent::NewHighScore { score });
            }
        }
        true
    }

    /// End the run: stop the clock and return to character selection
    fn reset(&mut self, cause: CrashCause) {
        self.clock.stop();

        let score = self.state.score;
        if self.high_score.record(score) && !self.announced_high_score {
            self.events.push(GameEvent::NewHighScore { score });
        }
        self.events.push(GameEvent::Crashed { score, cause });
        log::info!(
            "Run over ({:?}) with score {} (best {})",
            cause,
            score,
            self.high_score.best()
        );

        self.state.phase = GamePhase::SelectingCharacter;
        self.state.selected_character = None;
        self.state.last_score = score;
        self.state.score = 0;
        self.state.park(self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REFERENCE_FRAME_MS;
    use crate::highscore::MemoryStore;

    fn new_game(high_score: u32) -> Game {
        let mut game = Game::new(
            Settings::default(),
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::with_value(high_score)),
            12345,
        );
        game.resize(1920.0, 1080.0);
        game
    }

    /// Move the gap around the character so obstacles never hit it
    fn keep_in_gap(game: &mut Game) {
        game.state.obstacle.gap_offset = (game.state.position - 50.0).max(0.0);
    }

    /// Play frames at 60 Hz, flapping below mid-field, until `score` is reached
    fn play_until_score(game: &mut Game, epoch: u64, now: &mut f64, score: u32) {
        let mid = game.bounds.height / 2.0;
        for _ in 0..2000 {
            if game.state.score >= score {
                return;
            }
            if game.state.position > mid && game.state.velocity >= 0.0 {
                game.activate(*now);
            }
            keep_in_gap(game);
            *now += REFERENCE_FRAME_MS;
            assert!(game.frame(*now, epoch), "run ended unexpectedly");
        }
        panic!("score {} not reached", score);
    }

    #[test]
    fn test_activate_ignored_while_selecting() {
        let mut game = new_game(0);
        assert_eq!(game.activate(0.0), ActivateOutcome::Ignored);
        assert_eq!(game.state.phase, GamePhase::SelectingCharacter);
        assert!(!game.clock.is_running());
    }

    #[test]
    fn test_select_then_start() {
        let mut game = new_game(0);
        assert_eq!(game.select_character("yellow"), SelectOutcome::Selected);
        assert_eq!(game.state.phase, GamePhase::ReadyToStart);

        let outcome = game.activate(1000.0);
        assert!(matches!(outcome, ActivateOutcome::Started { .. }));
        assert_eq!(game.state.phase, GamePhase::Running);
        assert_eq!(game.state.position, game.bounds.height / 2.0);
        assert_eq!(game.state.velocity, 0.0);
        assert!(game.clock.is_running());
        assert_eq!(game.drain_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut game = new_game(0);
        game.select_character("yellow");
        let before = game.state.clone();
        assert_eq!(game.select_character("yellow"), SelectOutcome::Unchanged);
        assert_eq!(game.state.phase, before.phase);
        assert_eq!(game.state.selected_character, before.selected_character);
    }

    #[test]
    fn test_locked_character_rejected() {
        let mut game = new_game(1);
        assert_eq!(game.catalog.get("red").unwrap().unlock_score, 2);
        assert_eq!(game.select_character("red"), SelectOutcome::Locked);
        assert_eq!(game.state.phase, GamePhase::SelectingCharacter);
        assert!(game.state.selected_character.is_none());

        let mut game = new_game(2);
        assert_eq!(game.select_character("red"), SelectOutcome::Selected);
    }

    #[test]
    fn test_show_all_characters_override() {
        let settings = Settings {
            show_all_characters: true,
            ..Settings::default()
        };
        let mut game = Game::new(
            settings,
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::with_value(1)),
            1,
        );
        game.resize(1920.0, 1080.0);
        assert_eq!(game.select_character("red"), SelectOutcome::Selected);
    }

    #[test]
    fn test_unknown_character() {
        let mut game = new_game(0);
        assert_eq!(game.select_character("dragon"), SelectOutcome::UnknownCharacter);
        assert_eq!(game.state.phase, GamePhase::SelectingCharacter);
    }

    #[test]
    fn test_select_busy_while_running() {
        let mut game = new_game(0);
        game.select_character("yellow");
        game.activate(0.0);
        assert_eq!(game.select_character("yellow"), SelectOutcome::Busy);
        assert_eq!(game.state.selected_character.as_deref(), Some("yellow"));
    }

    #[test]
    fn test_flap_impulse() {
        let mut game = new_game(0);
        game.select_character("yellow");
        game.activate(0.0);
        assert_eq!(game.activate(10.0), ActivateOutcome::Flapped);
        assert_eq!(game.state.velocity, game.tuning().jump_force);
        assert_eq!(game.state.rotation, -game.tuning().max_rotation);
    }

    #[test]
    fn test_refuses_to_start_without_bounds() {
        let mut game = Game::new(
            Settings::default(),
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::default()),
            3,
        );
        game.select_character("yellow");
        assert_eq!(game.activate(0.0), ActivateOutcome::NotReady);
        assert_eq!(game.state.phase, GamePhase::ReadyToStart);
        assert!(!game.clock.is_running());

        game.resize(0.0, 0.0);
        assert_eq!(game.activate(0.0), ActivateOutcome::NotReady);
    }

    #[test]
    fn test_stale_frame_ignored() {
        let mut game = new_game(0);
        game.select_character("yellow");
        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };

        let before = game.state.clone();
        assert!(!game.frame(REFERENCE_FRAME_MS, epoch + 1));
        assert_eq!(game.state.position, before.position);
        assert_eq!(game.state.velocity, before.velocity);

        assert!(game.frame(REFERENCE_FRAME_MS, epoch));
        assert!(game.state.velocity > 0.0);
    }

    #[test]
    fn test_unsized_frames_keep_streams_current() {
        let mut game = new_game(0);
        game.select_character("yellow");
        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };
        game.state.obstacle.x = 10_000.0;
        let before = game.state.clone();

        game.resize(0.0, 0.0);
        let mut now = 0.0;
        for _ in 0..120 {
            now += REFERENCE_FRAME_MS;
            assert!(game.frame(now, epoch));
        }
        assert_eq!(game.state.position, before.position);
        assert_eq!(game.state.velocity, before.velocity);

        // Back to a real size: the next frame is one normal step, not two seconds
        game.resize(1920.0, 1080.0);
        now += REFERENCE_FRAME_MS;
        assert!(game.frame(now, epoch));
        assert_eq!(game.state.phase, GamePhase::Running);
        assert!((game.state.velocity - game.tuning().gravity).abs() < 1e-4);
    }

    #[test]
    fn test_floor_crash_resets() {
        let mut game = new_game(0);
        game.select_character("yellow");
        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };

        let mut now = 0.0;
        let mut frames = 0;
        while game.state.is_running() {
            keep_in_gap(&mut game);
            now += REFERENCE_FRAME_MS;
            game.frame(now, epoch);
            frames += 1;
            assert!(frames < 500);
        }

        assert_eq!(game.state.phase, GamePhase::SelectingCharacter);
        assert!(game.state.selected_character.is_none());
        assert_eq!(game.state.velocity, 0.0);
        assert_eq!(game.state.rotation, 0.0);
        assert_eq!(game.state.position, game.bounds.height / 2.0);
        assert_eq!(game.state.obstacle.x, game.bounds.width);
        assert!(!game.clock.is_running());
        assert_ne!(game.clock.epoch(), epoch);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Crashed {
            score: 0,
            cause: CrashCause::Floor
        }));

        // Frames still in flight after the reset do nothing
        let parked = game.state.clone();
        assert!(!game.frame(now + REFERENCE_FRAME_MS, epoch));
        assert_eq!(game.state.position, parked.position);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut game = new_game(0);
        assert_eq!(game.high_score(), 0);

        assert_eq!(game.select_character("yellow"), SelectOutcome::Selected);
        assert_eq!(game.state.phase, GamePhase::ReadyToStart);

        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };
        assert_eq!(game.state.phase, GamePhase::Running);
        assert_eq!(game.state.position, game.bounds.height / 2.0);

        let mut now = 0.0;
        play_until_score(&mut game, epoch, &mut now, 2);
        assert_eq!(game.state.score, 2);
        assert_eq!(game.high_score(), 2);

        // Force a collision with the top block
        let window_start = game.tuning().obstacle_width;
        game.state.obstacle.x = window_start + 40.0;
        game.state.obstacle.gap_offset = 100.0;
        game.state.position = 50.0;
        now += REFERENCE_FRAME_MS;
        assert!(!game.frame(now, epoch));

        assert_eq!(game.state.phase, GamePhase::SelectingCharacter);
        assert_eq!(game.state.score, 0);
        assert_eq!(game.state.last_score, 2);
        assert_eq!(game.high_score(), 2);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Scored { score: 1 }));
        assert!(events.contains(&GameEvent::Scored { score: 2 }));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::NewHighScore { .. }))
                .count(),
            1
        );
        assert_eq!(
            events.last(),
            Some(&GameEvent::Crashed {
                score: 2,
                cause: CrashCause::Obstacle
            })
        );

        // Red unlocks at 2
        assert_eq!(game.select_character("red"), SelectOutcome::Selected);
    }

    #[test]
    fn test_reset_keeps_higher_best() {
        let mut game = new_game(10);
        game.select_character("yellow");
        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };
        let mut now = 0.0;
        play_until_score(&mut game, epoch, &mut now, 1);

        game.state.obstacle.x = game.tuning().obstacle_width;
        game.state.obstacle.gap_offset = 100.0;
        game.state.position = 0.0;
        assert!(!game.frame(now + REFERENCE_FRAME_MS, epoch));

        assert_eq!(game.high_score(), 10);
        assert!(
            !game
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::NewHighScore { .. }))
        );
    }

    #[test]
    fn test_resize_parks_idle_state() {
        let mut game = new_game(0);
        game.resize(360.0, 800.0);
        assert_eq!(game.bounds.width, 342.0);
        assert_eq!(game.state.obstacle.x, 342.0);
        assert_eq!(game.state.position, game.bounds.height / 2.0);
        let gap = game.state.obstacle.gap_offset;
        assert!(gap >= 0.0 && gap < game.bounds.height - game.tuning().gap_height);
    }

    #[test]
    fn test_same_size_resize_keeps_gap() {
        let mut game = new_game(0);
        let gap = game.state.obstacle.gap_offset;
        for _ in 0..20 {
            game.resize(1920.0, 1080.0);
            assert_eq!(game.state.obstacle.gap_offset, gap);
        }
    }

    #[test]
    fn test_invalid_tuning_falls_back_to_defaults() {
        let mut settings = Settings::default();
        settings.tuning.max_rotation = -10.0;
        let mut game = Game::new(
            settings,
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::default()),
            9,
        );
        assert_eq!(game.tuning(), &Tuning::default());

        game.resize(1920.0, 1080.0);
        game.select_character("yellow");
        let ActivateOutcome::Started { epoch } = game.activate(0.0) else {
            panic!("run did not start");
        };
        assert!(game.frame(16.0, epoch));
    }
}
