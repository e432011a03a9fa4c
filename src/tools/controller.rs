use egui::{Color32, Pos2};

use crate::brush::BrushSettings;
use crate::command::Command;
use crate::tools::{Pointer, Tool, ToolContext, ToolMode, ToolPreview, ToolType, ViewTransform};

/// Turns pointer input into edit commands according to the active mode
#[derive(Debug, Clone)]
pub struct ToolController {
    mode: ToolMode,
    tool: ToolType,
    color: Color32,
    brush: BrushSettings,
    view: ViewTransform,
    viewport_origin: Pos2,
    canvas_size: [u32; 2],
    min_sample_distance: f32,
}

impl ToolController {
    pub const DEFAULT_MIN_SAMPLE_DISTANCE: f32 = 1.0;

    pub fn new(canvas_size: [u32; 2]) -> Self {
        Self {
            mode: ToolMode::Draw,
            tool: ToolType::for_mode(ToolMode::Draw),
            color: Color32::WHITE,
            brush: BrushSettings::default(),
            view: ViewTransform::default(),
            viewport_origin: Pos2::ZERO,
            canvas_size,
            min_sample_distance: Self::DEFAULT_MIN_SAMPLE_DISTANCE,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switch mode. Returns the previous mode; any in-progress edit is dropped.
    pub fn set_mode(&mut self, mode: ToolMode) -> ToolMode {
        let old = self.mode;
        if old == mode {
            return old;
        }
        self.tool.deactivate();
        self.tool = ToolType::for_mode(mode);
        self.tool.activate();
        self.mode = mode;
        log::info!("tool changed: {} -> {}", old.label(), mode.label());
        old
    }

    /// Flip between drawing and erasing. From Shape or Pan this selects Erase.
    pub fn toggle_eraser(&mut self) -> ToolMode {
        let next = match self.mode {
            ToolMode::Erase => ToolMode::Draw,
            _ => ToolMode::Erase,
        };
        self.set_mode(next)
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushSettings {
        &mut self.brush
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush.sanitized();
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    /// Screen position of the viewport's top-left corner
    pub fn set_viewport_origin(&mut self, origin: Pos2) {
        self.viewport_origin = origin;
    }

    pub fn viewport_origin(&self) -> Pos2 {
        self.viewport_origin
    }

    pub fn canvas_size(&self) -> [u32; 2] {
        self.canvas_size
    }

    /// Adopt a new canvas size, dropping any in-progress edit
    pub fn set_canvas_size(&mut self, size: [u32; 2]) {
        self.tool.deactivate();
        self.canvas_size = size;
    }

    pub fn min_sample_distance(&self) -> f32 {
        self.min_sample_distance
    }

    pub fn set_min_sample_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.min_sample_distance = distance.max(0.0);
        }
    }

    pub fn screen_to_canvas(&self, screen: Pos2) -> Pos2 {
        self.view.screen_to_canvas(self.viewport_origin, screen)
    }

    pub fn pointer_down(&mut self, screen: Pos2) -> Option<Command> {
        let pointer = self.pointer(screen);
        let (tool, mut ctx) = self.split();
        tool.on_pointer_down(pointer, &mut ctx)
    }

    pub fn pointer_move(&mut self, screen: Pos2) -> Option<Command> {
        let pointer = self.pointer(screen);
        let (tool, mut ctx) = self.split();
        tool.on_pointer_move(pointer, &mut ctx)
    }

    /// Finish the current edit. The returned command still has to be recorded.
    pub fn pointer_up(&mut self, screen: Pos2) -> Option<Command> {
        let pointer = self.pointer(screen);
        let (tool, mut ctx) = self.split();
        tool.on_pointer_up(pointer, &mut ctx)
    }

    /// Zoom by `factor` around a screen anchor
    pub fn zoom(&mut self, factor: f32, anchor: Pos2) {
        self.view.zoom_by(self.viewport_origin, factor, anchor);
    }

    pub fn pan(&mut self, delta: egui::Vec2) {
        self.view.pan_by(delta);
    }

    pub fn cancel_in_progress(&mut self) {
        self.tool.deactivate();
    }

    pub fn is_busy(&self) -> bool {
        self.tool.is_busy()
    }

    pub fn preview(&self) -> Option<ToolPreview> {
        self.tool.preview()
    }

    fn pointer(&self, screen: Pos2) -> Pointer {
        Pointer {
            screen,
            canvas: self.screen_to_canvas(screen),
        }
    }

    fn split(&mut self) -> (&mut ToolType, ToolContext<'_>) {
        let ctx = ToolContext {
            color: self.color,
            brush: &self.brush,
            view: &mut self.view,
            canvas_size: self.canvas_size,
            min_sample_distance: self.min_sample_distance,
        };
        (&mut self.tool, ctx)
    }
}
