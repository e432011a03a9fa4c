use crate::canvas::Canvas;
use crate::event::EventBus;

/// Context for command execution, providing access to the canvas
/// and the event system.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// The canvas being edited
    pub canvas: &'a mut Canvas,
    /// The event bus for broadcasting changes
    pub event_bus: &'a EventBus,
}

impl<'a> CommandContext<'a> {
    /// Create a new command context
    pub fn new(canvas: &'a mut Canvas, event_bus: &'a EventBus) -> Self {
        Self { canvas, event_bus }
    }
}
