use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

mod polygon;

pub use polygon::fill_spans;

/// An integer pixel rectangle covering `x..x + width` and `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const EMPTY: PixelRect = PixelRect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// The rectangle covering a whole `width`×`height` buffer.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(self, other: PixelRect) -> PixelRect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        PixelRect::new(x, y, right - x, bottom - y)
    }

    /// Pixels touched by a float rectangle, clamped to a `width`×`height` buffer.
    pub fn from_rect_clamped(rect: Rect, width: u32, height: u32) -> PixelRect {
        if !rect.is_finite() || rect.is_negative() {
            return PixelRect::EMPTY;
        }
        let min_x = rect.min.x.floor().clamp(0.0, width as f32) as u32;
        let min_y = rect.min.y.floor().clamp(0.0, height as f32) as u32;
        let max_x = rect.max.x.ceil().clamp(0.0, width as f32) as u32;
        let max_y = rect.max.y.ceil().clamp(0.0, height as f32) as u32;
        if max_x <= min_x || max_y <= min_y {
            return PixelRect::EMPTY;
        }
        PixelRect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn to_rect(self) -> Rect {
        Rect::from_min_max(
            Pos2::new(self.x as f32, self.y as f32),
            Pos2::new(self.right() as f32, self.bottom() as f32),
        )
    }

    /// Grows the rectangle into a square around its center, shifted to stay inside a
    /// `canvas_width`×`canvas_height` canvas. The result always covers `self`; on an axis
    /// where the square side exceeds the canvas the region spans the full canvas instead.
    pub fn padded_to_square(self, canvas_width: u32, canvas_height: u32) -> PixelRect {
        if self.is_empty() {
            return self;
        }
        let side = self.width.max(self.height);
        let (x, width) = fit_axis(self.x, self.width, side, canvas_width);
        let (y, height) = fit_axis(self.y, self.height, side, canvas_height);
        PixelRect::new(x, y, width, height)
    }
}

fn fit_axis(start: u32, len: u32, side: u32, limit: u32) -> (u32, u32) {
    if side >= limit {
        return (0, limit);
    }
    let centered = start as i64 + (len / 2) as i64 - (side / 2) as i64;
    let start = centered.clamp(0, (limit - side) as i64) as u32;
    (start, side)
}

/// Calculate distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rect_clamped() {
        let rect = Rect::from_min_max(Pos2::new(-4.0, 2.5), Pos2::new(10.2, 600.0));
        let pixels = PixelRect::from_rect_clamped(rect, 512, 512);
        assert_eq!(pixels, PixelRect::new(0, 2, 11, 510));

        let outside = Rect::from_min_max(Pos2::new(600.0, 600.0), Pos2::new(700.0, 700.0));
        assert!(PixelRect::from_rect_clamped(outside, 512, 512).is_empty());
    }

    #[test]
    fn test_union_ignores_empty() {
        let a = PixelRect::new(2, 2, 4, 4);
        assert_eq!(a.union(PixelRect::EMPTY), a);
        assert_eq!(PixelRect::EMPTY.union(a), a);
        assert_eq!(a.union(PixelRect::new(10, 0, 2, 2)), PixelRect::new(2, 0, 10, 6));
    }

    #[test]
    fn test_padded_to_square_covers_original() {
        let wide = PixelRect::new(100, 200, 60, 20);
        let square = wide.padded_to_square(512, 512);
        assert!(square.is_square());
        assert_eq!(square.width, 60);
        assert!(square.contains_rect(&wide));

        // Near the edge the square shifts back inside the canvas.
        let edge = PixelRect::new(500, 0, 12, 40);
        let square = edge.padded_to_square(512, 512);
        assert!(square.is_square());
        assert!(square.right() <= 512);
        assert!(square.contains_rect(&edge));
    }

    #[test]
    fn test_padded_to_square_larger_than_canvas() {
        let rect = PixelRect::new(0, 10, 300, 20);
        let region = rect.padded_to_square(512, 200);
        assert_eq!(region, PixelRect::new(0, 0, 300, 200));
        assert!(region.contains_rect(&rect));
    }

    #[test]
    fn test_distance_to_line_segment() {
        let d = distance_to_line_segment(Pos2::new(5.0, 3.0), Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0));
        assert!((d - 3.0).abs() < 1e-5);
        let d = distance_to_line_segment(Pos2::new(-3.0, 4.0), Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }
}
