use egui::Pos2;

use crate::command::Command;
use crate::tools::{Pointer, Tool, ToolContext};

/// Drags the view. Never edits the canvas.
#[derive(Debug, Clone, Default)]
pub struct PanTool {
    last_screen: Option<Pos2>,
}

impl PanTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for PanTool {
    fn name(&self) -> &'static str {
        "Pan"
    }

    fn deactivate(&mut self) {
        self.last_screen = None;
    }

    fn on_pointer_down(&mut self, pointer: Pointer, _ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.last_screen = Some(pointer.screen);
        None
    }

    fn on_pointer_move(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        if let Some(last) = self.last_screen {
            ctx.view.pan_by(pointer.screen - last);
            self.last_screen = Some(pointer.screen);
        }
        None
    }

    fn on_pointer_up(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        if let Some(last) = self.last_screen.take() {
            ctx.view.pan_by(pointer.screen - last);
        }
        None
    }

    fn is_busy(&self) -> bool {
        self.last_screen.is_some()
    }
}
