use super::{AppliedCommand, Command, CommandContext};
use crate::canvas::Canvas;
use crate::error::{HistoryDirection, HistoryError};
use crate::event::SessionEvent;
use crate::geometry::PixelRect;

/// Manages the history of executed commands for undo/redo functionality
#[derive(Debug, Default)]
pub struct CommandHistory {
    /// Stack of commands that can be undone, with the pixels they replaced
    undo_stack: Vec<AppliedCommand>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Command>,
    /// Oldest entries are dropped past this many undo steps
    limit: Option<usize>,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history that keeps at most `limit` undo steps
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::default()
        }
    }

    /// Apply a command and push it onto the undo stack. Any undone commands are discarded.
    pub fn record(&mut self, command: Command, ctx: &mut CommandContext<'_>) -> PixelRect {
        let applied = command.apply(ctx.canvas);
        let region = applied.region();
        log::debug!("recorded {} over {:?}", applied.command().label(), region);

        self.undo_stack.push(applied);
        self.redo_stack.clear();
        if let Some(limit) = self.limit {
            if self.undo_stack.len() > limit {
                let excess = self.undo_stack.len() - limit;
                self.undo_stack.drain(..excess);
            }
        }

        self.notify(ctx, region);
        region
    }

    /// Undo the last executed command
    pub fn undo(&mut self, ctx: &mut CommandContext<'_>) -> Result<PixelRect, HistoryError> {
        let applied = self
            .undo_stack
            .pop()
            .ok_or(HistoryError::EmptyHistory(HistoryDirection::Undo))?;

        let region = applied.invert().apply(ctx.canvas).region();
        self.redo_stack.push(applied.into_command());

        self.notify(ctx, region);
        Ok(region)
    }

    /// Redo the last undone command
    pub fn redo(&mut self, ctx: &mut CommandContext<'_>) -> Result<PixelRect, HistoryError> {
        let command = self
            .redo_stack
            .pop()
            .ok_or(HistoryError::EmptyHistory(HistoryDirection::Redo))?;

        let applied = command.apply(ctx.canvas);
        let region = applied.region();
        self.undo_stack.push(applied);

        self.notify(ctx, region);
        Ok(region)
    }

    fn notify(&self, ctx: &CommandContext<'_>, region: PixelRect) {
        ctx.event_bus.emit(SessionEvent::CanvasChanged { region });
        ctx.event_bus.emit(SessionEvent::HistoryChanged {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        });
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Maximum undo steps kept
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Applied commands, oldest first
    pub fn applied_commands(&self) -> impl Iterator<Item = &Command> {
        self.undo_stack.iter().map(AppliedCommand::command)
    }

    /// Undone commands in stack order; the last one is redone first
    pub fn undone_commands(&self) -> &[Command] {
        &self.redo_stack
    }

    /// The canvas as it was before the oldest command still on the undo stack.
    ///
    /// Differs from a blank canvas once the limit has dropped older commands.
    pub fn base_canvas(&self, canvas: &Canvas) -> Canvas {
        let mut base = canvas.clone();
        for applied in self.undo_stack.iter().rev() {
            applied.invert().apply(&mut base);
        }
        base
    }

    /// Bytes of pixel data held for undo
    pub fn memory_size(&self) -> usize {
        self.undo_stack.iter().map(AppliedCommand::memory_size).sum()
    }

    /// Clear the command history. The canvas is left as it is.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::canvas::Canvas;
    use crate::event::EventBus;
    use crate::stroke::{Stroke, StrokeMode};
    use egui::{Color32, Pos2};

    fn dot(x: f32, y: f32) -> Command {
        Command::Stroke(Stroke::new(
            StrokeMode::Draw,
            Color32::WHITE,
            BrushSettings::default(),
            vec![Pos2::new(x, y)],
        ))
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut canvas = Canvas::new(64, 64, Color32::BLACK);
        let bus = EventBus::new();
        let mut history = CommandHistory::with_limit(2);
        for i in 0..4 {
            let mut ctx = CommandContext::new(&mut canvas, &bus);
            history.record(dot(8.0 + i as f32 * 10.0, 8.0), &mut ctx);
        }
        assert_eq!(history.undo_len(), 2);

        // The two dropped dots are part of the base
        let base = history.base_canvas(&canvas);
        assert_eq!(base.pixel(8, 8), Some(Color32::WHITE));
        assert_eq!(base.pixel(18, 8), Some(Color32::WHITE));
        assert_eq!(base.pixel(28, 8), Some(Color32::BLACK));
        assert_eq!(base.pixel(38, 8), Some(Color32::BLACK));
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut canvas = Canvas::new(8, 8, Color32::BLACK);
        let bus = EventBus::new();
        let mut history = CommandHistory::new();
        let mut ctx = CommandContext::new(&mut canvas, &bus);
        assert_eq!(
            history.undo(&mut ctx),
            Err(HistoryError::EmptyHistory(HistoryDirection::Undo))
        );
        assert_eq!(
            history.redo(&mut ctx),
            Err(HistoryError::EmptyHistory(HistoryDirection::Redo))
        );
    }
}
