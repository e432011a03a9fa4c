use crate::command::Command;
use crate::stroke::{MutableStroke, StrokeMode};
use crate::tools::{Pointer, Tool, ToolContext, ToolPreview};

/// Freehand drawing and erasing
#[derive(Debug, Clone)]
pub struct DrawStrokeTool {
    mode: StrokeMode,
    // Transient state: the stroke being drawn (if any)
    current_stroke: Option<MutableStroke>,
}

impl DrawStrokeTool {
    pub fn new(mode: StrokeMode) -> Self {
        Self {
            mode,
            current_stroke: None,
        }
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }
}

impl Tool for DrawStrokeTool {
    fn name(&self) -> &'static str {
        match self.mode {
            StrokeMode::Draw => "Draw",
            StrokeMode::Erase => "Erase",
        }
    }

    fn activate(&mut self) {
        self.current_stroke = None;
    }

    fn deactivate(&mut self) {
        self.current_stroke = None;
    }

    fn on_pointer_down(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        let mut stroke = MutableStroke::new(self.mode, ctx.color, *ctx.brush, ctx.min_sample_distance);
        stroke.add_point(pointer.canvas);
        self.current_stroke = Some(stroke);
        None
    }

    fn on_pointer_move(&mut self, pointer: Pointer, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        if let Some(stroke) = &mut self.current_stroke {
            stroke.add_point(pointer.canvas);
        }
        None
    }

    fn on_pointer_up(&mut self, pointer: Pointer, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        let mut stroke = self.current_stroke.take()?;
        if stroke.is_empty() {
            return None;
        }
        stroke.add_point(pointer.canvas);
        Some(Command::Stroke(stroke.into_stroke()))
    }

    fn is_busy(&self) -> bool {
        self.current_stroke.is_some()
    }

    fn preview(&self) -> Option<ToolPreview> {
        self.current_stroke
            .as_ref()
            .filter(|stroke| !stroke.is_empty())
            .map(|stroke| ToolPreview::Stroke(stroke.to_stroke()))
    }
}
