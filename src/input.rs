use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in screen coordinates
    pub position: Pos2,
    /// Whether this position is within the drawing viewport
    pub is_in_canvas: bool,
}

/// Input the drawing viewport reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button was pressed
    PointerDown { location: InputLocation },
    /// Primary button was released
    PointerUp { location: InputLocation },
    /// Pointer moved while the primary button is held
    PointerDrag { location: InputLocation },
    /// Ctrl+wheel or pinch
    Zoom { factor: f32, anchor: Pos2 },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
        /// Generated by keyboard auto-repeat
        repeat: bool,
    },
    KeyUp { key: Key },
    /// The window lost focus; held keys are unknown from here on
    FocusLost,
}

impl InputEvent {
    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        match self {
            InputEvent::PointerDown { location }
            | InputEvent::PointerUp { location }
            | InputEvent::PointerDrag { location } => location.is_in_canvas,
            _ => false,
        }
    }
}

/// Handles converting raw egui input into InputEvents
#[derive(Debug)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    /// A drag that started inside the viewport keeps reporting until release
    dragging: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            dragging: false,
        }
    }

    /// Update the viewport rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Creates an InputLocation from a position
    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: pos,
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|input| self.process(input))
    }

    pub fn process(&mut self, input: &egui::InputState) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let pos = input.pointer.interact_pos().or(self.last_pointer_pos);

        if let Some(pos) = pos {
            let location = self.make_location(pos);
            if input.pointer.button_pressed(PointerButton::Primary) && location.is_in_canvas {
                self.dragging = true;
                events.push(InputEvent::PointerDown { location });
            } else if self.dragging && Some(pos) != self.last_pointer_pos {
                events.push(InputEvent::PointerDrag { location });
            }
            if self.dragging && input.pointer.button_released(PointerButton::Primary) {
                self.dragging = false;
                events.push(InputEvent::PointerUp { location });
            }
        }
        self.last_pointer_pos = input.pointer.hover_pos().or(pos);

        if let Some(anchor) = input.pointer.hover_pos().filter(|p| self.canvas_rect.contains(*p)) {
            let factor = input.zoom_delta();
            if factor != 1.0 {
                events.push(InputEvent::Zoom { factor, anchor });
            }
        }

        for event in &input.raw.events {
            match event {
                egui::Event::Key {
                    key,
                    pressed,
                    repeat,
                    modifiers,
                    ..
                } => {
                    events.push(if *pressed {
                        InputEvent::KeyDown {
                            key: *key,
                            modifiers: *modifiers,
                            repeat: *repeat,
                        }
                    } else {
                        InputEvent::KeyUp { key: *key }
                    });
                }
                egui::Event::WindowFocused(false) => events.push(InputEvent::FocusLost),
                _ => {}
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_in_canvas() {
        let handler = InputHandler::new(Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 100.0)));
        let inside = InputEvent::PointerDown {
            location: handler.make_location(Pos2::new(50.0, 50.0)),
        };
        let outside = InputEvent::PointerDrag {
            location: handler.make_location(Pos2::new(150.0, 50.0)),
        };
        assert!(inside.is_in_canvas());
        assert!(!outside.is_in_canvas());
        assert!(!InputEvent::FocusLost.is_in_canvas());
    }
}
