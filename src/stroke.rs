use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::brush::BrushSettings;
use crate::geometry::{self, PixelRect};

/// Whether a stroke paints with its color or restores the background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeMode {
    Draw,
    Erase,
}

// Immutable stroke, as recorded in the history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Pos2>,
    mode: StrokeMode,
    color: Color32,
    brush: BrushSettings,
}

impl Stroke {
    pub fn new(mode: StrokeMode, color: Color32, brush: BrushSettings, points: Vec<Pos2>) -> Self {
        Self {
            points,
            mode,
            color,
            brush: brush.sanitized(),
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// The color actually laid down. Erase strokes always paint the background.
    pub fn paint_color(&self, background: Color32) -> Color32 {
        match self.mode {
            StrokeMode::Draw => self.color,
            StrokeMode::Erase => background,
        }
    }

    /// Area covered by the brush footprint, in canvas coordinates
    pub fn bounds(&self) -> Rect {
        geometry::calculate_bounds(&self.points, self.brush.radius() + 1.0)
    }
}

// Mutable stroke for editing
#[derive(Clone, Debug)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    mode: StrokeMode,
    color: Color32,
    brush: BrushSettings,
    min_distance: f32,
}

impl MutableStroke {
    pub fn new(mode: StrokeMode, color: Color32, brush: BrushSettings, min_distance: f32) -> Self {
        Self {
            points: Vec::new(),
            mode,
            color,
            brush,
            min_distance,
        }
    }

    /// Append a sample point. Returns false when the point was skipped for being too
    /// close to the last kept point.
    pub fn add_point(&mut self, point: Pos2) -> bool {
        push_sampled(&mut self.points, point, self.min_distance)
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mode(&self) -> StrokeMode {
        self.mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn to_stroke(&self) -> Stroke {
        Stroke::new(self.mode, self.color, self.brush, self.points.clone())
    }

    pub fn into_stroke(self) -> Stroke {
        Stroke::new(self.mode, self.color, self.brush, self.points)
    }
}

/// Pushes `point` unless it lies within `min_distance` of the last point.
pub(crate) fn push_sampled(points: &mut Vec<Pos2>, point: Pos2, min_distance: f32) -> bool {
    if !point.x.is_finite() || !point.y.is_finite() {
        return false;
    }
    if let Some(last) = points.last() {
        if last.distance(point) < min_distance {
            return false;
        }
    }
    points.push(point);
    true
}

/// A closed lasso polygon filled with a solid color
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    points: Vec<Pos2>,
    color: Color32,
    region: PixelRect,
}

impl Shape {
    /// Close a lasso path and compute its square region on a `canvas_width`×`canvas_height`
    /// canvas. Returns `None` when the lasso does not enclose anything on the canvas.
    pub fn from_lasso(
        mut points: Vec<Pos2>,
        color: Color32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Option<Self> {
        points.dedup();
        if points.len() < 3 {
            return None;
        }
        if points.first() != points.last() {
            points.push(points[0]);
        }

        let bounds = geometry::calculate_bounds(&points, 0.0);
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return None;
        }
        let region = PixelRect::from_rect_clamped(bounds, canvas_width, canvas_height)
            .padded_to_square(canvas_width, canvas_height);
        if region.is_empty() {
            return None;
        }

        Some(Self {
            points,
            color,
            region,
        })
    }

    /// Polygon points; the last point equals the first.
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    /// Square canvas region the shape is recorded against
    pub fn region(&self) -> PixelRect {
        self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutable_stroke_skips_close_points() {
        let mut stroke = MutableStroke::new(StrokeMode::Draw, Color32::WHITE, BrushSettings::default(), 2.0);
        assert!(stroke.add_point(Pos2::new(0.0, 0.0)));
        assert!(!stroke.add_point(Pos2::new(1.0, 1.0)));
        assert!(stroke.add_point(Pos2::new(3.0, 0.0)));
        assert!(!stroke.add_point(Pos2::new(f32::NAN, 0.0)));
        assert_eq!(stroke.points().len(), 2);
    }

    #[test]
    fn test_erase_paints_background() {
        let stroke = Stroke::new(StrokeMode::Erase, Color32::RED, BrushSettings::default(), vec![Pos2::ZERO]);
        assert_eq!(stroke.paint_color(Color32::BLACK), Color32::BLACK);
    }

    #[test]
    fn test_lasso_is_closed() {
        let shape = Shape::from_lasso(
            vec![Pos2::new(10.0, 10.0), Pos2::new(50.0, 10.0), Pos2::new(50.0, 30.0)],
            Color32::RED,
            512,
            512,
        )
        .unwrap();
        assert_eq!(shape.points().first(), shape.points().last());
        assert!(shape.region().is_square());
    }

    #[test]
    fn test_degenerate_lasso() {
        let collinear = vec![Pos2::new(0.0, 5.0), Pos2::new(5.0, 5.0), Pos2::new(9.0, 5.0)];
        assert!(Shape::from_lasso(collinear, Color32::RED, 512, 512).is_none());
        assert!(Shape::from_lasso(vec![Pos2::ZERO, Pos2::new(1.0, 1.0)], Color32::RED, 512, 512).is_none());
    }
}
