//! Flappy Web entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent,
        MouseEvent, TouchEvent,
    };

    use flappy_web::highscore::LocalStorageStore;
    use flappy_web::render::{FrameView, Overlay};
    use flappy_web::sim::GameEvent;
    use flappy_web::{ActivateOutcome, CharacterCatalog, Game, Settings};

    const SKY: &str = "#4ec0ca";
    const PIPE: &str = "#73bf2e";
    const PIPE_EDGE: &str = "#4a7a1a";
    const PANEL: &str = "rgba(0, 0, 0, 0.8)";
    const TEXT: &str = "#ffffff";
    const LOCKED: &str = "#888888";

    /// Game instance plus everything the browser side needs to draw it
    struct App {
        game: Game,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        images: HashMap<String, HtmlImageElement>,
    }

    impl App {
        fn resize(&mut self) {
            let window = web_sys::window().unwrap();
            let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            self.game.resize(w as f32, h as f32);

            let bounds = self.game.bounds();
            self.canvas.set_width(bounds.width as u32);
            self.canvas.set_height(bounds.height as u32);
        }

        /// Route a tap at playfield `point`
        fn tap(&mut self, point: Vec2) -> Option<u64> {
            if let Some(view) = FrameView::capture(&self.game) {
                if let Some(id) = view.option_at(point) {
                    let id = id.to_string();
                    self.game.select_character(&id);
                    return None;
                }
            }
            self.activate()
        }

        /// Returns the epoch of a run that just started
        fn activate(&mut self) -> Option<u64> {
            match self.game.activate(now()) {
                ActivateOutcome::Started { epoch } => Some(epoch),
                _ => None,
            }
        }

        fn handle_events(&mut self) {
            for event in self.game.drain_events() {
                match event {
                    GameEvent::NewHighScore { score } => log::info!("New high score: {}", score),
                    GameEvent::Crashed { score, cause } => {
                        log::info!("Crashed into {:?} at score {}", cause, score)
                    }
                    _ => {}
                }
            }
        }

        fn image(&mut self, src: &str) -> Option<HtmlImageElement> {
            if let Some(img) = self.images.get(src) {
                return Some(img.clone());
            }
            let img = HtmlImageElement::new().ok()?;
            img.set_src(src);
            self.images.insert(src.to_string(), img.clone());
            Some(img)
        }

        fn draw(&mut self) {
            let Some(view) = FrameView::capture(&self.game) else {
                return;
            };
            let ctx = self.ctx.clone();
            let (w, h) = (view.bounds.width as f64, view.bounds.height as f64);

            ctx.set_fill_style_str(SKY);
            ctx.fill_rect(0.0, 0.0, w, h);

            if let Some(obstacles) = view.obstacles {
                for rect in [obstacles.top, obstacles.bottom] {
                    ctx.set_fill_style_str(PIPE);
                    ctx.fill_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        rect.size.x as f64,
                        rect.size.y as f64,
                    );
                    ctx.set_stroke_style_str(PIPE_EDGE);
                    ctx.stroke_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        rect.size.x as f64,
                        rect.size.y as f64,
                    );
                }
            }

            if let Some(character) = &view.character {
                if let Some(img) = self.image(&character.image_ref) {
                    let center = character.rect.center();
                    let size = character.rect.size;
                    ctx.save();
                    let _ = ctx.translate(center.x as f64, center.y as f64);
                    let _ = ctx.rotate((character.rotation as f64).to_radians());
                    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        &img,
                        -(size.x as f64) / 2.0,
                        -(size.y as f64) / 2.0,
                        size.x as f64,
                        size.y as f64,
                    );
                    ctx.restore();
                }
            }

            ctx.set_fill_style_str(TEXT);
            ctx.set_text_align("center");
            ctx.set_font("40px 'Press Start 2P', monospace");
            let _ = ctx.fill_text(&view.score.to_string(), w / 2.0, 90.0);

            match &view.overlay {
                Overlay::SelectCharacter { title, options } => {
                    ctx.set_fill_style_str(PANEL);
                    ctx.fill_rect(w * 0.05, h * 0.2, w * 0.9, h * 0.6);
                    ctx.set_fill_style_str(TEXT);
                    ctx.set_font("14px 'Press Start 2P', monospace");
                    let top = options.first().map(|o| o.rect.min.y as f64).unwrap_or(h / 2.0);
                    let _ = ctx.fill_text(title, w / 2.0, top - 16.0);

                    for option in options {
                        let r = option.rect;
                        let label_y = r.max().y as f64 - 4.0;
                        if let Some(img) = self.image(&option.image_ref) {
                            let side = (r.size.x).min(r.size.y - 20.0) as f64;
                            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                                &img,
                                r.center().x as f64 - side / 2.0,
                                r.min.y as f64,
                                side,
                                side,
                            );
                        }
                        ctx.set_font("8px 'Press Start 2P', monospace");
                        if option.unlocked {
                            ctx.set_fill_style_str(TEXT);
                            let _ = ctx.fill_text(&option.display_name, r.center().x as f64, label_y);
                        } else {
                            ctx.set_fill_style_str(LOCKED);
                            let label = format!("Score {}", option.unlock_score);
                            let _ = ctx.fill_text(&label, r.center().x as f64, label_y);
                        }
                    }
                }
                Overlay::TapToStart => {
                    ctx.set_fill_style_str(PANEL);
                    ctx.fill_rect(w / 2.0 - 80.0, h * 0.49, 160.0, 36.0);
                    ctx.set_fill_style_str(TEXT);
                    ctx.set_font("12px 'Press Start 2P', monospace");
                    let _ = ctx.fill_text("Tap Bird To Start", w / 2.0, h * 0.49 + 23.0);
                }
                Overlay::None => {}
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy Web starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = match document.get_element_by_id("canvas") {
            Some(el) => el.dyn_into().expect("not a canvas"),
            None => {
                let el = document.create_element("canvas").expect("no canvas");
                el.set_id("canvas");
                document
                    .body()
                    .expect("no body")
                    .append_child(&el)
                    .expect("append canvas");
                el.dyn_into().expect("not a canvas")
            }
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load();
        let catalog = match CharacterCatalog::builtin() {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Character catalog unusable: {}", e);
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(settings, catalog, Box::new(LocalStorageStore), seed);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            canvas: canvas.clone(),
            ctx,
            images: HashMap::new(),
        }));
        {
            let mut a = app.borrow_mut();
            a.resize();
            a.draw();
        }

        setup_input_handlers(&canvas, app.clone());

        log::info!("Flappy Web running!");
    }

    fn after_input(app: &Rc<RefCell<App>>, started: Option<u64>) {
        {
            let mut a = app.borrow_mut();
            a.handle_events();
            a.draw();
        }
        if let Some(epoch) = started {
            request_animation_frame(app.clone(), epoch);
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();

        // Resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                a.resize();
                a.draw();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let point = Vec2::new(event.offset_x() as f32, event.offset_y() as f32);
                let started = app.borrow_mut().tap(point);
                after_input(&app, started);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(touch) = event.touches().get(0) else {
                    return;
                };
                let rect = canvas_clone.get_bounding_client_rect();
                let point = Vec2::new(
                    touch.client_x() as f32 - rect.left() as f32,
                    touch.client_y() as f32 - rect.top() as f32,
                );
                let started = app.borrow_mut().tap(point);
                after_input(&app, started);
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let started = match event.key().as_str() {
                    " " | "Enter" | "ArrowUp" => app.borrow_mut().activate(),
                    _ => return,
                };
                after_input(&app, started);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Schedule the next frame; frames from a stopped run are dropped by their epoch
    fn request_animation_frame(app: Rc<RefCell<App>>, epoch: u64) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time, epoch);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64, epoch: u64) {
        let keep_running = {
            let mut a = app.borrow_mut();
            let keep_running = a.game.frame(time, epoch);
            a.handle_events();
            a.draw();
            keep_running
        };

        if keep_running {
            request_animation_frame(app, epoch);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Flappy Web (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Headless autopilot session at a virtual 60 Hz
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use flappy_web::consts::REFERENCE_FRAME_MS;
    use flappy_web::highscore::{FileStore, MemoryStore, ScoreStore};
    use flappy_web::sim::GameEvent;
    use flappy_web::{ActivateOutcome, CharacterCatalog, Game, Settings};

    /// Environment variable naming the high score file
    const HIGHSCORE_ENV: &str = "FLAPPY_HIGHSCORE";
    /// Give up after two virtual minutes
    const MAX_FRAMES: u32 = 60 * 120;

    pub fn run() -> Result<(), flappy_web::catalog::CatalogError> {
        let settings = Settings::load();
        let catalog = CharacterCatalog::builtin()?;
        let store: Box<dyn ScoreStore> = match std::env::var(HIGHSCORE_ENV) {
            Ok(path) => Box::new(FileStore::new(path)),
            Err(_) => Box::new(MemoryStore::default()),
        };

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut game = Game::new(settings, catalog, store, seed);
        game.resize(1280.0, 720.0);
        log::info!(
            "Playfield {}x{}, seed {}",
            game.bounds().width,
            game.bounds().height,
            seed
        );

        let starter = game.catalog().starter().id.clone();
        game.select_character(&starter);

        let mut now = 0.0;
        let ActivateOutcome::Started { epoch } = game.activate(now) else {
            log::error!("Run did not start");
            return Ok(());
        };

        let mut frames = 0;
        while frames < MAX_FRAMES {
            autopilot(&mut game, now);
            now += REFERENCE_FRAME_MS;
            let keep_running = game.frame(now, epoch);
            for event in game.drain_events() {
                match event {
                    GameEvent::Scored { score } => log::info!("Score {}", score),
                    GameEvent::NewHighScore { score } => log::info!("New high score {}", score),
                    GameEvent::Crashed { score, cause } => {
                        log::info!("Crashed into {:?} with score {}", cause, score)
                    }
                    _ => {}
                }
            }
            frames += 1;
            if !keep_running {
                break;
            }
        }

        let state = game.state();
        let score = if state.is_running() {
            state.score
        } else {
            state.last_score
        };
        println!(
            "Played {:.1}s: score {}, best {}",
            frames as f64 / 60.0,
            score,
            game.high_score()
        );
        Ok(())
    }

    /// Flap whenever the character sinks below the middle of the gap
    fn autopilot(game: &mut Game, now: f64) {
        let state = game.state();
        let tuning = game.tuning();
        let target = state.obstacle.gap_offset + tuning.gap_height / 2.0 - tuning.character_height / 2.0;
        if state.position > target && state.velocity >= 0.0 {
            game.activate(now);
        }
    }
}
