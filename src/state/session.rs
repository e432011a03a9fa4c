use std::path::{Path, PathBuf};

use egui::{Color32, Pos2};
use image::imageops;
use uuid::Uuid;

use crate::canvas::{Canvas, PixelPatch};
use crate::command::{Command, CommandContext, CommandHistory};
use crate::error::{GenerationError, HistoryError, PersistenceResult, SessionError};
use crate::event::{DirtyRegionTracker, EventBus, EventHandler, LoggingHandler, SessionEvent};
use crate::generation::{GenerationBackend, GenerationConfig, GenerationOutcome, GenerationSession};
use crate::geometry::PixelRect;
use crate::image_history::ImageHistory;
use crate::settings::Settings;
use crate::shortcuts::Action;
use crate::tools::{ToolController, ToolMode};

/// What a dispatched action still needs from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    Done,
    /// Save was requested but the drawing has no file yet
    SavePathNeeded,
}

/// Everything belonging to one drawing session
#[derive(Debug)]
pub struct Session {
    canvas: Canvas,
    history: CommandHistory,
    tools: ToolController,
    generation: GenerationSession,
    images: ImageHistory,
    config: GenerationConfig,
    event_bus: EventBus,
    dirty: DirtyRegionTracker,
    drawing_path: Option<PathBuf>,
}

impl Session {
    pub fn new(settings: &Settings, backend: Box<dyn GenerationBackend>) -> Self {
        let [width, height] = settings.canvas_size();
        let canvas = Canvas::new(width, height, settings.background);

        let mut tools = ToolController::new(canvas.size());
        tools.set_color(settings.color);
        tools.set_brush(settings.brush);
        tools.set_min_sample_distance(settings.min_sample_distance);

        let history = match settings.history_limit {
            Some(limit) => CommandHistory::with_limit(limit),
            None => CommandHistory::new(),
        };

        let dirty = DirtyRegionTracker::new();
        let event_bus = EventBus::new();
        event_bus.subscribe(Box::new(LoggingHandler));
        event_bus.subscribe(Box::new(dirty.clone()));
        dirty.mark(canvas.full_rect());

        log::info!("new session with a {width}x{height} canvas");
        Self {
            canvas,
            history,
            tools,
            generation: GenerationSession::new(backend),
            images: ImageHistory::new(),
            config: settings.generation.clone(),
            event_bus,
            dirty,
            drawing_path: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolController {
        &mut self.tools
    }

    pub fn generation(&self) -> &GenerationSession {
        &self.generation
    }

    pub fn generation_mut(&mut self) -> &mut GenerationSession {
        &mut self.generation
    }

    pub fn images(&self) -> &ImageHistory {
        &self.images
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GenerationConfig {
        &mut self.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.event_bus.subscribe(handler);
    }

    /// Canvas region changed since the last call
    pub fn take_dirty_region(&self) -> Option<PixelRect> {
        self.dirty.take()
    }

    pub fn drawing_path(&self) -> Option<&Path> {
        self.drawing_path.as_deref()
    }

    // --- drawing ---

    /// Apply and record a command. Commands that touch nothing are dropped.
    pub fn record(&mut self, command: Command) -> Option<PixelRect> {
        if command.is_degenerate(&self.canvas) {
            log::debug!("discarded degenerate {}", command.label());
            return None;
        }
        let mut ctx = CommandContext::new(&mut self.canvas, &self.event_bus);
        Some(self.history.record(command, &mut ctx))
    }

    pub fn pointer_down(&mut self, screen: Pos2) -> Option<PixelRect> {
        let command = self.tools.pointer_down(screen)?;
        self.record(command)
    }

    pub fn pointer_move(&mut self, screen: Pos2) -> Option<PixelRect> {
        let command = self.tools.pointer_move(screen)?;
        self.record(command)
    }

    pub fn pointer_up(&mut self, screen: Pos2) -> Option<PixelRect> {
        let command = self.tools.pointer_up(screen)?;
        self.record(command)
    }

    pub fn undo(&mut self) -> Result<PixelRect, HistoryError> {
        let mut ctx = CommandContext::new(&mut self.canvas, &self.event_bus);
        self.history.undo(&mut ctx)
    }

    pub fn redo(&mut self) -> Result<PixelRect, HistoryError> {
        let mut ctx = CommandContext::new(&mut self.canvas, &self.event_bus);
        self.history.redo(&mut ctx)
    }

    /// Reset the canvas to the background. Undoable.
    pub fn clear(&mut self) -> Option<PixelRect> {
        self.record(Command::Clear)
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        let old = self.tools.set_mode(mode);
        if old != mode {
            self.event_bus.emit(SessionEvent::ToolChanged { old, new: mode });
        }
    }

    pub fn toggle_eraser(&mut self) {
        let old = self.tools.toggle_eraser();
        let new = self.tools.mode();
        self.event_bus.emit(SessionEvent::ToolChanged { old, new });
    }

    pub fn set_color(&mut self, color: Color32) {
        self.tools.set_color(color);
    }

    // --- generation ---

    /// Send the current drawing to the backend with the session config
    pub fn generate(&mut self) -> Result<Uuid, GenerationError> {
        let snapshot = self.canvas.render();
        let request_id = self.generation.generate(&snapshot, &self.config)?;
        self.event_bus.emit(SessionEvent::GenerationStarted { request_id });
        Ok(request_id)
    }

    /// Pick up a finished generation, if any. Call once per frame.
    pub fn poll_generation(&mut self) -> Option<GenerationOutcome> {
        let outcome = self.generation.poll(&mut self.images)?;
        match &outcome {
            GenerationOutcome::Completed {
                request_id,
                position,
            } => {
                let index = self.images.current().map_or(*position, |image| image.index);
                self.event_bus.emit(SessionEvent::GenerationCompleted {
                    request_id: *request_id,
                    index,
                });
                self.event_bus.emit(SessionEvent::ImageSelected {
                    index: Some(*position),
                });
            }
            GenerationOutcome::Failed { request_id, error } => {
                self.event_bus.emit(SessionEvent::GenerationFailed {
                    request_id: *request_id,
                    reason: error.to_string(),
                });
            }
        }
        Some(outcome)
    }

    pub fn cancel_generation(&mut self) -> Option<Uuid> {
        let request_id = self.generation.cancel()?;
        self.event_bus.emit(SessionEvent::GenerationCancelled { request_id });
        Some(request_id)
    }

    // --- image history ---

    pub fn previous_image(&mut self) {
        self.images.previous();
        self.emit_selection();
    }

    pub fn next_image(&mut self) {
        self.images.next();
        self.emit_selection();
    }

    pub fn delete_current_image(&mut self) {
        if let Some(removed) = self.images.delete_current() {
            log::info!("deleted generated image {}", removed.id);
            self.emit_selection();
        }
    }

    pub fn save_current_image(&self, path: &Path) -> PersistenceResult<()> {
        self.images.save_current(path)
    }

    fn emit_selection(&self) {
        self.event_bus.emit(SessionEvent::ImageSelected {
            index: self.images.position(),
        });
    }

    // --- files ---

    /// Write the canvas as PNG and remember the path for later saves
    pub fn save_drawing(&mut self, path: &Path) -> PersistenceResult<()> {
        self.canvas
            .pixels()
            .save_with_format(path, image::ImageFormat::Png)?;
        log::info!("saved drawing to {}", path.display());
        self.drawing_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the canvas with an image file, resized to the canvas. Undoable.
    pub fn load_drawing(&mut self, path: &Path) -> PersistenceResult<Option<PixelRect>> {
        let mut image = image::open(path)?.to_rgba8();
        let [width, height] = self.canvas.size();
        if image.dimensions() != (width, height) {
            log::info!(
                "resizing {}x{} drawing to {width}x{height}",
                image.width(),
                image.height()
            );
            image = imageops::resize(&image, width, height, imageops::FilterType::Lanczos3);
        }
        let region = self.record(Command::Restore(PixelPatch::from_image(&image)));
        self.drawing_path = Some(path.to_path_buf());
        Ok(region)
    }

    /// Run a shortcut action
    pub fn dispatch(&mut self, action: Action) -> Result<ActionResult, SessionError> {
        match action {
            Action::Undo => {
                self.undo()?;
            }
            Action::Redo => {
                self.redo()?;
            }
            Action::Generate => {
                self.generate()?;
            }
            Action::Save => match self.drawing_path.clone() {
                Some(path) => self.save_drawing(&path)?,
                None => return Ok(ActionResult::SavePathNeeded),
            },
        }
        Ok(ActionResult::Done)
    }

    /// Swap in a restored canvas and history
    pub(crate) fn replace_drawing(&mut self, canvas: Canvas, history: CommandHistory) {
        self.tools.set_canvas_size(canvas.size());
        self.canvas = canvas;
        self.history = history;
        let region = self.canvas.full_rect();
        self.event_bus.emit(SessionEvent::CanvasChanged { region });
        self.event_bus.emit(SessionEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}
