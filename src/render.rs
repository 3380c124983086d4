//! Read-only frame snapshot for renderers
//!
//! Turns the simulation state into screen-space rectangles, a rotation and an
//! overlay description. Whatever draws the game (canvas, terminal, test) only
//! needs this snapshot and never touches the game core directly.

use glam::Vec2;

use crate::consts::CHARACTER_X;
use crate::game::Game;
use crate::sim::GamePhase;
use crate::viewport::PlayfieldBounds;

/// Characters per row in the selection grid
pub const GRID_COLUMNS: usize = 3;
/// Space reserved for a name label under each preview
const LABEL_HEIGHT: f32 = 24.0;
/// Space reserved for the grid title
const TITLE_HEIGHT: f32 = 40.0;
const CELL_PADDING: f32 = 6.0;

/// Axis-aligned rectangle in playfield units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }
}

/// The flying character
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSprite {
    pub rect: Rect,
    /// Degrees, rotated about the rect centre
    pub rotation: f32,
    pub image_ref: String,
}

/// The obstacle pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSprites {
    pub top: Rect,
    pub bottom: Rect,
}

/// One entry of the character selection grid
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterOption {
    pub id: String,
    pub display_name: String,
    pub image_ref: String,
    pub unlock_score: u32,
    pub unlocked: bool,
    pub rect: Rect,
}

/// What is drawn on top of the playfield
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Selection grid with a title
    SelectCharacter {
        title: String,
        options: Vec<CharacterOption>,
    },
    /// "Tap Bird To Start"
    TapToStart,
    None,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub bounds: PlayfieldBounds,
    pub score: u32,
    pub high_score: u32,
    pub character: Option<CharacterSprite>,
    pub obstacles: Option<ObstacleSprites>,
    pub overlay: Overlay,
}

impl FrameView {
    /// Snapshot the game; `None` until the playfield has a size
    pub fn capture(game: &Game) -> Option<Self> {
        let bounds = game.bounds();
        if !bounds.is_ready() {
            return None;
        }
        let state = game.state();
        let tuning = game.tuning();

        // Character and obstacles are shown once a character is chosen
        let (character, obstacles) = match game.selected_character() {
            Some(descriptor) => {
                let character = CharacterSprite {
                    rect: Rect::new(
                        CHARACTER_X,
                        state.position,
                        tuning.character_width,
                        tuning.character_height,
                    ),
                    rotation: state.rotation,
                    image_ref: descriptor.image_ref.clone(),
                };
                let obstacle = &state.obstacle;
                let obstacles = ObstacleSprites {
                    top: Rect::new(obstacle.x, 0.0, tuning.obstacle_width, obstacle.gap_offset),
                    bottom: Rect::new(
                        obstacle.x,
                        obstacle.gap_bottom(tuning.gap_height),
                        tuning.obstacle_width,
                        obstacle.bottom_height(bounds.height, tuning.gap_height),
                    ),
                };
                (Some(character), Some(obstacles))
            }
            None => (None, None),
        };

        let overlay = match state.phase {
            GamePhase::SelectingCharacter => {
                let title = if state.last_score > 0 {
                    format!("Game Over! Score: {}", state.last_score)
                } else {
                    "Select Your Bird".to_string()
                };
                let cells = character_grid(bounds, game.catalog().len());
                let options = game
                    .catalog()
                    .iter()
                    .zip(cells)
                    .map(|(c, rect)| CharacterOption {
                        id: c.id.clone(),
                        display_name: c.display_name.clone(),
                        image_ref: c.image_ref.clone(),
                        unlock_score: c.unlock_score,
                        unlocked: game.is_selectable(c),
                        rect,
                    })
                    .collect();
                Overlay::SelectCharacter { title, options }
            }
            GamePhase::ReadyToStart => Overlay::TapToStart,
            GamePhase::Running => Overlay::None,
        };

        Some(Self {
            bounds,
            score: state.score,
            high_score: game.high_score(),
            character,
            obstacles,
            overlay,
        })
    }

    /// Character id under `point`, if the selection grid is showing
    pub fn option_at(&self, point: Vec2) -> Option<&str> {
        match &self.overlay {
            Overlay::SelectCharacter { options, .. } => options
                .iter()
                .find(|o| o.rect.contains(point))
                .map(|o| o.id.as_str()),
            _ => None,
        }
    }
}

/// Cell rectangles for `count` characters, centred in the playfield
pub fn character_grid(bounds: PlayfieldBounds, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let panel_width = bounds.width * 0.8;
    let cell_width = panel_width / GRID_COLUMNS as f32;
    let cell_height = cell_width + LABEL_HEIGHT;
    let rows = count.div_ceil(GRID_COLUMNS);

    let panel_height = TITLE_HEIGHT + rows as f32 * cell_height;
    let left = (bounds.width - panel_width) / 2.0;
    let top = (bounds.height - panel_height) / 2.0 + TITLE_HEIGHT;

    (0..count)
        .map(|i| {
            let col = (i % GRID_COLUMNS) as f32;
            let row = (i / GRID_COLUMNS) as f32;
            Rect::new(
                left + col * cell_width + CELL_PADDING,
                top + row * cell_height + CELL_PADDING,
                cell_width - 2.0 * CELL_PADDING,
                cell_height - 2.0 * CELL_PADDING,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CharacterCatalog;
    use crate::highscore::MemoryStore;
    use crate::settings::Settings;

    fn new_game() -> Game {
        let mut game = Game::new(
            Settings::default(),
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::default()),
            42,
        );
        game.resize(1920.0, 1080.0);
        game
    }

    #[test]
    fn test_no_view_before_sizing() {
        let game = Game::new(
            Settings::default(),
            CharacterCatalog::builtin().unwrap(),
            Box::new(MemoryStore::default()),
            42,
        );
        assert!(FrameView::capture(&game).is_none());
    }

    #[test]
    fn test_selection_overlay() {
        let game = new_game();
        let view = FrameView::capture(&game).unwrap();
        assert!(view.character.is_none());
        assert!(view.obstacles.is_none());

        let Overlay::SelectCharacter { title, options } = &view.overlay else {
            panic!("expected selection overlay");
        };
        assert_eq!(title, "Select Your Bird");
        assert_eq!(options.len(), game.catalog().len());
        assert!(options[0].unlocked);
        assert!(options.iter().any(|o| !o.unlocked));
    }

    #[test]
    fn test_option_hit_test() {
        let game = new_game();
        let view = FrameView::capture(&game).unwrap();
        let Overlay::SelectCharacter { options, .. } = &view.overlay else {
            panic!("expected selection overlay");
        };
        let first = options[0].rect.center();
        assert_eq!(view.option_at(first), Some("yellow"));
        assert_eq!(view.option_at(Vec2::new(-10.0, -10.0)), None);
    }

    #[test]
    fn test_sprites_follow_state() {
        let mut game = new_game();
        game.select_character("yellow");
        let view = FrameView::capture(&game).unwrap();
        assert_eq!(view.overlay, Overlay::TapToStart);

        let character = view.character.unwrap();
        assert_eq!(character.rect.min, Vec2::new(CHARACTER_X, 300.0));
        assert_eq!(character.image_ref, "images/yellowbird-upflap.png");

        let obstacles = view.obstacles.unwrap();
        let gap = game.state().obstacle.gap_offset;
        assert_eq!(obstacles.top.size.y, gap);
        assert_eq!(obstacles.bottom.min.y, gap + game.tuning().gap_height);
        assert_eq!(obstacles.bottom.max().y, view.bounds.height);
    }

    #[test]
    fn test_grid_layout() {
        let bounds = PlayfieldBounds::new(300.0, 600.0);
        let cells = character_grid(bounds, 5);
        assert_eq!(cells.len(), 5);
        // Row-major, three to a row
        assert_eq!(cells[0].min.y, cells[2].min.y);
        assert!(cells[3].min.y > cells[0].min.y);
        assert_eq!(cells[3].min.x, cells[0].min.x);
        assert!(cells.iter().all(|c| c.min.x >= 0.0 && c.max().x <= bounds.width));
        assert!(character_grid(bounds, 0).is_empty());
    }
}
