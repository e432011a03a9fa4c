use std::fs;
use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};

use super::Session;
use crate::brush::BrushSettings;
use crate::canvas::{Canvas, PixelPatch};
use crate::command::{Command, CommandContext, CommandHistory};
use crate::error::{PersistenceError, PersistenceResult};
use crate::event::EventBus;
use crate::generation::GenerationConfig;
use crate::geometry::PixelRect;
use crate::util::time;

/// A drawing session as stored on disk: the command log, not the pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Version of the application when the snapshot was taken
    pub version: String,
    /// Timestamp of when the snapshot was taken
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    pub background: Color32,
    /// Pixels under the oldest applied command, when older edits fell out of the history
    #[serde(default)]
    pub base: Option<PixelPatch>,
    /// Applied commands, oldest first
    pub applied: Vec<Command>,
    /// Undone commands in redo-stack order; the last one is redone first
    pub undone: Vec<Command>,
    pub generation: GenerationConfig,
    pub brush: BrushSettings,
    pub color: Color32,
}

impl SessionSnapshot {
    /// Create a new snapshot from the current session
    pub fn capture(session: &Session) -> Self {
        let canvas = session.canvas();
        let base = session.history().base_canvas(canvas);
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: time::timestamp_secs(),
            width: canvas.width(),
            height: canvas.height(),
            background: canvas.background(),
            base: (!base.is_blank()).then(|| PixelPatch::from_image(base.pixels())),
            applied: session.history().applied_commands().cloned().collect(),
            undone: session.history().undone_commands().to_vec(),
            generation: session.config().clone(),
            brush: *session.tools().brush(),
            color: session.tools().color(),
        }
    }

    pub fn save(&self, path: &Path) -> PersistenceResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("saved session snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> PersistenceResult<Self> {
        let json = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> PersistenceResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PersistenceError::InvalidState(format!(
                "canvas size {}x{}",
                self.width, self.height
            )));
        }
        if let Some(base) = &self.base {
            if !base.is_consistent() || base.region() != PixelRect::full(self.width, self.height) {
                return Err(PersistenceError::InvalidState(
                    "base layer does not match the canvas size".into(),
                ));
            }
        }
        let broken_patch = self
            .applied
            .iter()
            .chain(&self.undone)
            .any(|command| matches!(command, Command::Restore(patch) if !patch.is_consistent()));
        if broken_patch {
            return Err(PersistenceError::InvalidState(
                "pixel patch does not match its region".into(),
            ));
        }
        Ok(())
    }

    /// Rebuild canvas and history by replaying the command log
    pub fn rebuild(&self, limit: Option<usize>) -> PersistenceResult<(Canvas, CommandHistory)> {
        self.validate()?;
        if self.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "snapshot version {} differs from current version {}",
                self.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        let mut canvas = Canvas::new(self.width, self.height, self.background);
        if let Some(base) = &self.base {
            canvas.restore(base);
        }
        let mut history = match limit {
            Some(limit) => CommandHistory::with_limit(limit.max(self.applied.len() + self.undone.len())),
            None => CommandHistory::new(),
        };
        // Replay happens off the live bus; the session announces the result once.
        let bus = EventBus::new();
        let mut ctx = CommandContext::new(&mut canvas, &bus);

        for command in &self.applied {
            history.record(command.clone(), &mut ctx);
        }
        // Re-apply undone commands in their original order, then undo them again
        for command in self.undone.iter().rev() {
            history.record(command.clone(), &mut ctx);
        }
        for _ in 0..self.undone.len() {
            history.undo(&mut ctx).map_err(|e| {
                PersistenceError::InvalidState(format!("replaying undone commands: {e}"))
            })?;
        }

        Ok((canvas, history))
    }

    /// Replace the session's drawing, history and settings with this snapshot
    pub fn restore(self, session: &mut Session) -> PersistenceResult<()> {
        let limit = session.history().limit();
        let (canvas, history) = self.rebuild(limit)?;
        session.replace_drawing(canvas, history);
        *session.config_mut() = self.generation;
        session.tools_mut().set_brush(self.brush);
        session.tools_mut().set_color(self.color);
        log::info!(
            "restored session: {} applied, {} undone",
            self.applied.len(),
            self.undone.len()
        );
        Ok(())
    }
}
