use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{GenerationError, SessionError};
use crate::generation::GenerationOutcome;
use crate::input::{InputEvent, InputHandler};
use crate::panels::{central_panel, generation_panel, tools_panel};
use crate::renderer::Renderer;
use crate::settings::Settings;
use crate::shortcuts::{Action, ShortcutDispatcher};
use crate::state::{ActionResult, Session, SessionSnapshot};

pub struct DoodlePixApp {
    settings: Settings,
    session: Session,
    renderer: Renderer,
    input: InputHandler,
    shortcuts: ShortcutDispatcher,
    status: Option<String>,
}

impl DoodlePixApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        settings.apply_env_overrides();

        let mut app = Self::with_settings(settings);
        let ctx = cc.egui_ctx.clone();
        app.session
            .generation_mut()
            .set_waker(Arc::new(move || ctx.request_repaint()));
        app
    }

    /// An app without a window context, e.g. for tests
    pub fn with_settings(settings: Settings) -> Self {
        let backend = Box::new(settings.backend.build());
        let session = Session::new(&settings, backend);
        Self {
            settings,
            session,
            renderer: Renderer::new(),
            input: InputHandler::default(),
            shortcuts: ShortcutDispatcher::new(),
            status: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub(crate) fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    pub(crate) fn parts(&mut self) -> (&mut Session, &mut Settings, &mut Renderer) {
        (&mut self.session, &mut self.settings, &mut self.renderer)
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        log::info!("{status}");
        self.status = Some(status);
    }

    /// Copy live session values back into the persisted settings
    fn sync_settings(&mut self) {
        self.settings.generation = self.session.config().clone();
        self.settings.brush = *self.session.tools().brush();
        self.settings.color = self.session.tools().color();
    }

    pub fn run_action(&mut self, action: Action) {
        match self.session.dispatch(action) {
            Ok(ActionResult::Done) => {
                if action == Action::Save {
                    if let Some(path) = self.session.drawing_path() {
                        self.set_status(format!("Saved {}", path.display()));
                    }
                }
            }
            Ok(ActionResult::SavePathNeeded) => self.save_drawing_as(),
            Err(SessionError::History(e)) => log::debug!("{} ignored: {e}", action.label()),
            Err(SessionError::Generation(GenerationError::InvalidConfig(e))) => {
                self.set_status(format!("Cannot generate: {e}"));
            }
            Err(e) => self.set_status(format!("{} failed: {e}", action.label())),
        }
    }

    pub(crate) fn save_drawing_as(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name("drawing.png")
            .save_file()
        else {
            return;
        };
        match self.session.save_drawing(&path) {
            Ok(()) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => self.set_status(format!("Save failed: {e}")),
        }
    }

    pub(crate) fn open_drawing(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .pick_file()
        else {
            return;
        };
        match self.session.load_drawing(&path) {
            Ok(_) => self.set_status(format!("Loaded {}", path.display())),
            Err(e) => self.set_status(format!("Load failed: {e}")),
        }
    }

    pub(crate) fn save_current_image(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name("generated.png")
            .save_file()
        else {
            return;
        };
        match self.session.save_current_image(&path) {
            Ok(()) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => self.set_status(format!("Save failed: {e}")),
        }
    }

    pub(crate) fn save_snapshot(&mut self, path: &Path) {
        match SessionSnapshot::capture(&self.session).save(path) {
            Ok(()) => self.set_status(format!("Session saved to {}", path.display())),
            Err(e) => self.set_status(format!("Session save failed: {e}")),
        }
    }

    pub(crate) fn restore_snapshot(&mut self, path: &Path) {
        let restored = SessionSnapshot::load(path).and_then(|snapshot| snapshot.restore(&mut self.session));
        match restored {
            Ok(()) => self.set_status(format!("Session restored from {}", path.display())),
            Err(e) => self.set_status(format!("Session restore failed: {e}")),
        }
    }

    pub(crate) fn pick_session_file(save: bool) -> Option<PathBuf> {
        let dialog = rfd::FileDialog::new().add_filter("DoodlePix session", &["json"]);
        if save {
            dialog.set_file_name("session.json").save_file()
        } else {
            dialog.pick_file()
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let events = self.input.process_input(ctx);
        let typing = ctx.wants_keyboard_input();
        for event in events {
            match event {
                InputEvent::PointerDown { location } => {
                    self.session.pointer_down(location.position);
                }
                InputEvent::PointerDrag { location } => {
                    self.session.pointer_move(location.position);
                }
                InputEvent::PointerUp { location } => {
                    self.session.pointer_up(location.position);
                }
                InputEvent::Zoom { factor, anchor } => {
                    self.session.tools_mut().zoom(factor, anchor);
                }
                InputEvent::KeyDown {
                    key,
                    modifiers,
                    repeat,
                } => {
                    let action = self.shortcuts.key_down(key, modifiers, repeat);
                    if let Some(action) = action.filter(|_| !typing) {
                        self.run_action(action);
                    }
                }
                InputEvent::KeyUp { key } => self.shortcuts.key_up(key),
                InputEvent::FocusLost => self.shortcuts.reset(),
            }
        }
    }

    fn poll_generation(&mut self, ctx: &egui::Context) {
        match self.session.poll_generation() {
            Some(GenerationOutcome::Completed { .. }) => {
                let count = self.session.images().len();
                self.set_status(format!("Generated image {count}"));
            }
            Some(GenerationOutcome::Failed { error, .. }) => {
                self.set_status(format!("Generation failed: {error}"));
            }
            None => {}
        }
        if self.session.generation().is_requesting() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

impl eframe::App for DoodlePixApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.sync_settings();
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_generation(ctx);
        self.handle_input(ctx);

        tools_panel(self, ctx);
        generation_panel(self, ctx);
        central_panel(self, ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.cancel_generation();
    }
}
