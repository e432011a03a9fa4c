use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::brush::BrushSettings;
use crate::command::Command;
use crate::stroke::{Stroke, StrokeMode};

mod controller;
mod draw_stroke_tool;
mod lasso_tool;
mod pan_tool;
mod view;

pub use controller::ToolController;
pub use draw_stroke_tool::DrawStrokeTool;
pub use lasso_tool::LassoTool;
pub use pan_tool::PanTool;
pub use view::ViewTransform;

/// What the pointer does on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Draw,
    Erase,
    Shape,
    Pan,
}

impl ToolMode {
    pub const ALL: [ToolMode; 4] = [ToolMode::Draw, ToolMode::Erase, ToolMode::Shape, ToolMode::Pan];

    pub fn label(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Erase => "Erase",
            Self::Shape => "Shape",
            Self::Pan => "Pan",
        }
    }
}

/// A pointer sample in both coordinate spaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Position in screen points
    pub screen: Pos2,
    /// Position in canvas pixels
    pub canvas: Pos2,
}

/// Everything a tool may consult or change while handling a pointer event
#[derive(Debug)]
pub struct ToolContext<'a> {
    pub color: Color32,
    pub brush: &'a BrushSettings,
    pub view: &'a mut ViewTransform,
    pub canvas_size: [u32; 2],
    /// Samples closer than this to the previous one are dropped
    pub min_sample_distance: f32,
}

/// In-progress work a tool wants drawn on top of the canvas
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPreview {
    Stroke(Stroke),
    Lasso { points: Vec<Pos2>, color: Color32 },
}

/// Tool trait defines the interface for all canvas tools
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Called when the tool is selected (activated).
    fn activate(&mut self) {
        // default: do nothing
    }

    /// Called when the tool is deselected. Any unfinished work is dropped.
    fn deactivate(&mut self);

    /// Handle pointer press on the canvas. Returns a command only if the press alone
    /// completes an edit.
    fn on_pointer_down(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command>;

    /// Handle pointer drag while the pointer is held down.
    fn on_pointer_move(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command>;

    /// Handle pointer release. Returns the finished edit, if any.
    fn on_pointer_up(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command>;

    /// True while an edit is being accumulated
    fn is_busy(&self) -> bool;

    fn preview(&self) -> Option<ToolPreview> {
        None
    }
}

/// Enum representing all available tool types
#[derive(Debug, Clone)]
pub enum ToolType {
    DrawStroke(DrawStrokeTool),
    Lasso(LassoTool),
    Pan(PanTool),
}

impl ToolType {
    /// A fresh tool instance for a mode
    pub fn for_mode(mode: ToolMode) -> Self {
        match mode {
            ToolMode::Draw => Self::DrawStroke(DrawStrokeTool::new(StrokeMode::Draw)),
            ToolMode::Erase => Self::DrawStroke(DrawStrokeTool::new(StrokeMode::Erase)),
            ToolMode::Shape => Self::Lasso(LassoTool::new()),
            ToolMode::Pan => Self::Pan(PanTool::new()),
        }
    }
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::DrawStroke(tool) => tool.name(),
            Self::Lasso(tool) => tool.name(),
            Self::Pan(tool) => tool.name(),
        }
    }

    fn activate(&mut self) {
        match self {
            Self::DrawStroke(tool) => tool.activate(),
            Self::Lasso(tool) => tool.activate(),
            Self::Pan(tool) => tool.activate(),
        }
    }

    fn deactivate(&mut self) {
        match self {
            Self::DrawStroke(tool) => tool.deactivate(),
            Self::Lasso(tool) => tool.deactivate(),
            Self::Pan(tool) => tool.deactivate(),
        }
    }

    fn on_pointer_down(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::DrawStroke(tool) => tool.on_pointer_down(pointer, ctx),
            Self::Lasso(tool) => tool.on_pointer_down(pointer, ctx),
            Self::Pan(tool) => tool.on_pointer_down(pointer, ctx),
        }
    }

    fn on_pointer_move(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::DrawStroke(tool) => tool.on_pointer_move(pointer, ctx),
            Self::Lasso(tool) => tool.on_pointer_move(pointer, ctx),
            Self::Pan(tool) => tool.on_pointer_move(pointer, ctx),
        }
    }

    fn on_pointer_up(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        match self {
            Self::DrawStroke(tool) => tool.on_pointer_up(pointer, ctx),
            Self::Lasso(tool) => tool.on_pointer_up(pointer, ctx),
            Self::Pan(tool) => tool.on_pointer_up(pointer, ctx),
        }
    }

    fn is_busy(&self) -> bool {
        match self {
            Self::DrawStroke(tool) => tool.is_busy(),
            Self::Lasso(tool) => tool.is_busy(),
            Self::Pan(tool) => tool.is_busy(),
        }
    }

    fn preview(&self) -> Option<ToolPreview> {
        match self {
            Self::DrawStroke(tool) => tool.preview(),
            Self::Lasso(tool) => tool.preview(),
            Self::Pan(tool) => tool.preview(),
        }
    }
}
