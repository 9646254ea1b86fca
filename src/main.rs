//! Suika Merge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use suika_merge::journal::{self, GameLog, LogEntry};
    use suika_merge::persistence::{self, Autosave};
    use suika_merge::platform::{LocalStorage, now_ms};
    use suika_merge::renderer::{CanvasRenderer, build_scene};
    use suika_merge::sim::{Container, GameEvent, GameState, PauseReason, TickInput, tick};
    use suika_merge::{Settings, highscores};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        store: LocalStorage,
        journal: GameLog<LocalStorage>,
        renderer: CanvasRenderer,
        input: TickInput,
        autosave: Autosave,
        last_time: f64,
        /// Journal length and newest entry last pushed to the DOM
        shown_log: Option<(usize, LogEntry)>,
    }

    impl Game {
        /// Run simulation ticks and route the resulting events
        fn update(&mut self, dt: f32) {
            let input = std::mem::take(&mut self.input);
            tick(&mut self.state, &input, dt);

            let now = now_ms();
            for event in self.state.drain_events() {
                self.journal.record_event(&event, now);
                match event {
                    GameEvent::NewHighScore { score } => {
                        if let Err(e) = highscores::save(&self.store, score) {
                            self.journal.error(format!("Failed to save high score: {e}"), now);
                        }
                    }
                    GameEvent::GameOver { .. } => persistence::clear_game(&self.store),
                    _ => {}
                }
            }

            if self.settings.autosave && self.autosave.poll(now) && !self.state.is_paused() {
                self.save_game(now);
            }
            self.journal.heartbeat(now);
        }

        fn save_game(&mut self, now: f64) {
            if let Err(e) = persistence::save_game(&self.store, &self.state, now) {
                self.journal.error(format!("Failed to save the game: {e}"), now);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let scene = build_scene(&self.state, &self.settings);
            if let Err(e) = self.renderer.draw(&scene) {
                log::warn!("Render error: {:?}", e);
            }
        }

        /// Mirror the journal into the #game-log panel when it changed
        fn update_log_panel(&mut self) {
            let Some(newest) = self.journal.entries().next().cloned() else {
                return;
            };
            let shown = Some((self.journal.len(), newest));
            if self.shown_log == shown {
                return;
            }
            self.shown_log = shown;

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(panel) = document.get_element_by_id("game-log") else {
                return;
            };
            panel.set_inner_html("");
            for entry in self.journal.entries() {
                if let Ok(row) = document.create_element("div") {
                    row.set_class_name(&format!("log-entry log-{}", entry.level.as_str()));
                    row.set_text_content(Some(&format!("[{}] {}", entry.timestamp, entry.message)));
                    let _ = panel.append_child(&row);
                }
            }
        }

        /// Persist what should survive a reload
        fn shutdown(&mut self) {
            let now = now_ms();
            if self.settings.autosave {
                self.save_game(now);
            }
            if let Err(e) = self.journal.end_session() {
                log::error!("Failed to save the journal: {}", e);
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Suika Merge starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let store = LocalStorage::open().ok_or("local storage unavailable")?;
        let settings = Settings::load(&store);
        let now = now_ms();

        let mut journal = GameLog::load(store.clone(), settings.effective_log_capacity());
        journal.check_forced_close(now);
        journal.heartbeat(now);

        let seed = now as u64;
        let container = Container::new(canvas.width() as f32, canvas.height() as f32);
        let mut state = GameState::new(seed, container);
        state.tuning = settings.tuning;
        state.high_score = highscores::load(&store);

        match persistence::load_game(&store, now) {
            Ok(Some(snapshot)) => snapshot.apply(&mut state),
            Ok(None) => {}
            Err(e) => journal.warning(format!("Discarded saved game: {e}"), now),
        }
        for event in state.drain_events() {
            journal.record_event(&event, now);
        }
        journal.info("Game started", now);

        let renderer = CanvasRenderer::new(&canvas)?;
        let game = Rc::new(RefCell::new(Game {
            state,
            settings,
            store,
            journal,
            renderer,
            input: TickInput::default(),
            autosave: Autosave::new(now),
            last_time: 0.0,
            shown_log: None,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_lifecycle_handlers(game.clone());
        setup_error_log_download(game.clone());

        request_animation_frame(game);

        log::info!("Suika Merge running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Mouse move - pending piece follows the pointer
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                // Scale CSS pixels to canvas pixels
                let scale = if rect.width() > 0.0 {
                    canvas_clone.width() as f64 / rect.width()
                } else {
                    1.0
                };
                let x = (event.client_x() as f64 - rect.left()) * scale;
                game.borrow_mut().input.target_x = Some(x as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click - drop, or restart after game over
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().input.commit = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.key().as_str(), "p" | "P") {
                    game.borrow_mut().input.pause = true;
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_lifecycle_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        if let Some(document) = window.document() {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur {
                        g.state.pause(PauseReason::FocusLost);
                    }
                }
            });
            let _ = document
                .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.pause_on_blur {
                    g.state.pause(PauseReason::FocusLost);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page unload - save the session and journal
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().shutdown();
            });
            let _ = window
                .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Offer the persisted error reports as a Markdown download
    fn setup_error_log_download(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(button) = document.get_element_by_id("error-log-download") else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let reports = game.borrow().journal.error_reports();
            let Some(markdown) = journal::error_report_markdown(&reports) else {
                log::info!("No error reports to download");
                return;
            };
            if let Err(e) = download_text(&journal::error_report_filename(now_ms()), &markdown) {
                log::error!("Failed to download error log: {:?}", e);
            }
        });
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn download_text(filename: &str, contents: &str) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let parts = js_sys::Array::of1(&JsValue::from_str(contents));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type("text/markdown");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)?;

        let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();
        web_sys::Url::revoke_object_url(&url)?;
        log::info!("Error log downloaded");
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            g.render();
            g.update_log_panel();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use suika_merge::consts::SIM_DT;
    use suika_merge::platform::{MemoryStore, now_ms};
    use suika_merge::sim::{Container, GameState, TickInput, tick};
    use suika_merge::{GameLog, Settings, highscores};

    /// Frames between autoplay drops
    const DROP_EVERY: u64 = 40;
    /// Stop after this many frames even if the board never fills
    const MAX_FRAMES: u64 = 60 * 60 * 10;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Suika Merge (native) starting headless autoplay...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);
    let store = MemoryStore::new();
    let settings = Settings::load(&store);
    let mut journal = GameLog::new(store.clone(), settings.effective_log_capacity());

    let mut state = GameState::new(seed, Container::default());
    state.tuning = settings.tuning;
    state.high_score = highscores::load(&store);
    let mut rng = Pcg32::seed_from_u64(seed ^ 0xD06);

    for frame in 0..MAX_FRAMES {
        let mut input = TickInput::default();
        if frame % DROP_EVERY == 0 {
            let width = state.container.width();
            input.target_x = Some(rng.random_range(0.0..width));
            input.commit = true;
        }
        tick(&mut state, &input, SIM_DT);

        let now = now_ms();
        for event in state.drain_events() {
            journal.record_event(&event, now);
        }
        if state.is_over() {
            break;
        }
    }

    if let Err(e) = highscores::submit(&store, state.high_score) {
        log::error!("Failed to store high score: {}", e);
    }
    println!(
        "Final score: {} (high score {}, {} frames, {} pieces on the board)",
        state.score,
        state.high_score,
        state.time_ticks,
        state.pieces.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
