use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Maps canvas pixels to screen points: `screen = origin + offset + canvas * scale`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    offset: Vec2,
    scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub const MIN_SCALE: f32 = 0.1;
    pub const MAX_SCALE: f32 = 5.0;

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn screen_to_canvas(&self, origin: Pos2, screen: Pos2) -> Pos2 {
        ((screen - origin - self.offset) / self.scale).to_pos2()
    }

    pub fn canvas_to_screen(&self, origin: Pos2, canvas: Pos2) -> Pos2 {
        origin + self.offset + canvas.to_vec2() * self.scale
    }

    /// Screen rectangle covered by a canvas of `size` pixels
    pub fn canvas_rect(&self, origin: Pos2, size: [u32; 2]) -> Rect {
        let min = self.canvas_to_screen(origin, Pos2::ZERO);
        Rect::from_min_size(min, Vec2::new(size[0] as f32, size[1] as f32) * self.scale)
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.offset += delta;
        }
    }

    /// Multiply the scale by `factor`, keeping the canvas point under `anchor` fixed
    pub fn zoom_by(&mut self, origin: Pos2, factor: f32, anchor: Pos2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let fixed = self.screen_to_canvas(origin, anchor);
        self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        self.offset = anchor - origin - fixed.to_vec2() * self.scale;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_mapping() {
        let mut view = ViewTransform::default();
        view.pan_by(Vec2::new(15.0, -4.0));
        view.zoom_by(Pos2::new(100.0, 50.0), 2.0, Pos2::new(140.0, 90.0));
        let origin = Pos2::new(100.0, 50.0);
        let point = Pos2::new(33.0, 21.0);
        let back = view.screen_to_canvas(origin, view.canvas_to_screen(origin, point));
        assert!((back - point).length() < 1e-3);
    }

    #[test]
    fn test_zoom_keeps_anchor_and_clamps() {
        let origin = Pos2::ZERO;
        let mut view = ViewTransform::default();
        let anchor = Pos2::new(40.0, 40.0);
        view.zoom_by(origin, 100.0, anchor);
        assert_eq!(view.scale(), ViewTransform::MAX_SCALE);
        assert!((view.screen_to_canvas(origin, anchor) - anchor).length() < 1e-3);
        view.zoom_by(origin, 0.0001, anchor);
        assert_eq!(view.scale(), ViewTransform::MIN_SCALE);
    }
}
