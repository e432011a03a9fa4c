use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, PixelPatch};
use crate::geometry::PixelRect;
use crate::stroke::{Shape, Stroke, StrokeMode};

/// Edits that can be applied to the canvas and undone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Paint or erase along a freehand path
    Stroke(Stroke),

    /// Fill a closed lasso polygon
    Shape(Shape),

    /// Reset the whole canvas to the background
    Clear,

    /// Write saved pixels back; the inverse of every other command
    Restore(PixelPatch),
}

impl Command {
    /// Short name for history listings
    pub fn label(&self) -> &'static str {
        match self {
            Command::Stroke(stroke) => match stroke.mode() {
                StrokeMode::Draw => "Stroke",
                StrokeMode::Erase => "Erase",
            },
            Command::Shape(_) => "Fill Shape",
            Command::Clear => "Clear",
            Command::Restore(_) => "Restore",
        }
    }

    /// The canvas region this command touches
    pub fn region(&self, canvas: &Canvas) -> PixelRect {
        match self {
            Command::Stroke(stroke) => canvas.stroke_region(stroke),
            Command::Shape(shape) => canvas.clamp(shape.region()),
            Command::Clear => canvas.full_rect(),
            Command::Restore(patch) => patch.region(),
        }
    }

    /// A command that touches no pixel is never worth recording.
    pub fn is_degenerate(&self, canvas: &Canvas) -> bool {
        match self {
            Command::Stroke(stroke) if stroke.points().is_empty() => true,
            Command::Restore(patch) if !patch.is_consistent() => true,
            _ => self.region(canvas).is_empty(),
        }
    }

    /// Apply the command, saving the pixels of its region first so it can be inverted.
    pub fn apply(self, canvas: &mut Canvas) -> AppliedCommand {
        let before = canvas.capture(self.region(canvas));
        let region = match &self {
            Command::Stroke(stroke) => canvas.paint_stroke(stroke),
            Command::Shape(shape) => canvas.fill_shape(shape),
            Command::Clear => canvas.clear(),
            Command::Restore(patch) => canvas.restore(patch),
        };
        AppliedCommand {
            command: self,
            before,
            region,
        }
    }
}

/// A command that has been applied, together with the pixels it replaced
#[derive(Clone, Debug)]
pub struct AppliedCommand {
    command: Command,
    before: PixelPatch,
    region: PixelRect,
}

impl AppliedCommand {
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Region changed when the command was applied
    pub fn region(&self) -> PixelRect {
        self.region
    }

    /// The command that undoes this one
    pub fn invert(&self) -> Command {
        Command::Restore(self.before.clone())
    }

    pub fn into_command(self) -> Command {
        self.command
    }

    /// Bytes of pixel data held for undo
    pub fn memory_size(&self) -> usize {
        self.before.memory_size()
    }
}
