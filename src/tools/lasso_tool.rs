use egui::Pos2;

use crate::command::Command;
use crate::stroke::{self, Shape};
use crate::tools::{Pointer, Tool, ToolContext, ToolPreview};

/// Draws a closed outline and fills it with the current color on release
#[derive(Debug, Clone, Default)]
pub struct LassoTool {
    points: Vec<Pos2>,
    active: bool,
    color: egui::Color32,
}

impl LassoTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.points.clear();
        self.active = false;
    }
}

impl Tool for LassoTool {
    fn name(&self) -> &'static str {
        "Shape"
    }

    fn deactivate(&mut self) {
        self.reset();
    }

    fn on_pointer_down(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        self.reset();
        self.active = true;
        self.color = ctx.color;
        stroke::push_sampled(&mut self.points, pointer.canvas, ctx.min_sample_distance);
        None
    }

    fn on_pointer_move(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        if self.active {
            stroke::push_sampled(&mut self.points, pointer.canvas, ctx.min_sample_distance);
        }
        None
    }

    fn on_pointer_up(&mut self, pointer: Pointer, ctx: &mut ToolContext<'_>) -> Option<Command> {
        if !self.active {
            return None;
        }
        stroke::push_sampled(&mut self.points, pointer.canvas, ctx.min_sample_distance);
        let points = std::mem::take(&mut self.points);
        self.reset();

        let [width, height] = ctx.canvas_size;
        match Shape::from_lasso(points, self.color, width, height) {
            Some(shape) => Some(Command::Shape(shape)),
            None => {
                log::debug!("lasso discarded: encloses no area");
                None
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.active
    }

    fn preview(&self) -> Option<ToolPreview> {
        if !self.active || self.points.len() < 2 {
            return None;
        }
        Some(ToolPreview::Lasso {
            points: self.points.clone(),
            color: self.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::tools::ViewTransform;
    use egui::Color32;

    fn at(x: f32, y: f32) -> Pointer {
        Pointer {
            screen: Pos2::new(x, y),
            canvas: Pos2::new(x, y),
        }
    }

    #[test]
    fn test_lasso_needs_three_points() {
        let brush = BrushSettings::default();
        let mut view = ViewTransform::default();
        let mut ctx = ToolContext {
            color: Color32::RED,
            brush: &brush,
            view: &mut view,
            canvas_size: [64, 64],
            min_sample_distance: 1.0,
        };
        let mut tool = LassoTool::new();
        tool.on_pointer_down(at(10.0, 10.0), &mut ctx);
        assert!(tool.is_busy());
        assert!(tool.on_pointer_up(at(20.0, 10.0), &mut ctx).is_none());
        assert!(!tool.is_busy());

        tool.on_pointer_down(at(10.0, 10.0), &mut ctx);
        tool.on_pointer_move(at(30.0, 10.0), &mut ctx);
        let command = tool.on_pointer_up(at(20.0, 30.0), &mut ctx);
        match command {
            Some(Command::Shape(shape)) => {
                assert_eq!(shape.color(), Color32::RED);
                assert!(shape.region().is_square());
            }
            other => panic!("expected a shape, got {:?}", other),
        }
    }
}
