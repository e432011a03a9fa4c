//! The raster surface the user draws on.
//!
//! The canvas is a fixed-size RGBA buffer. It is only mutated through edit commands
//! (see [`crate::command`]), which capture the pixels they are about to overwrite so
//! that every edit can be inverted exactly.

use std::sync::Arc;

use egui::{Color32, Pos2};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, PixelRect};
use crate::stroke::{Shape, Stroke};

/// Raster buffer owned by the active session
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: RgbaImage,
    background: Color32,
    version: u64,
}

impl Canvas {
    pub const DEFAULT_SIZE: u32 = 512;

    /// Creates a canvas cleared to `background`. Zero dimensions are bumped to one pixel.
    pub fn new(width: u32, height: u32, background: Color32) -> Self {
        let buffer = RgbaImage::from_pixel(width.max(1), height.max(1), to_rgba(background));
        Self {
            buffer,
            background,
            version: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width(), self.height()]
    }

    pub fn full_rect(&self) -> PixelRect {
        PixelRect::full(self.width(), self.height())
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    /// Incremented on every mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        self.buffer.get_pixel_checked(x, y).map(|p| {
            let [r, g, b, a] = p.0;
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
    }

    /// Read-only access to the raw buffer
    pub fn pixels(&self) -> &RgbaImage {
        &self.buffer
    }

    /// True when every pixel equals the background
    pub fn is_blank(&self) -> bool {
        let background = to_rgba(self.background);
        self.buffer.pixels().all(|p| *p == background)
    }

    /// An immutable copy of the current buffer for display or generation.
    pub fn render(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            image: Arc::new(self.buffer.clone()),
            version: self.version,
        }
    }

    /// Canvas pixels a stroke would touch
    pub fn stroke_region(&self, stroke: &Stroke) -> PixelRect {
        if stroke.points().is_empty() {
            return PixelRect::EMPTY;
        }
        PixelRect::from_rect_clamped(stroke.bounds(), self.width(), self.height())
    }

    /// Save the pixels of `region` (clamped to the canvas).
    pub(crate) fn capture(&self, region: PixelRect) -> PixelPatch {
        let region = self.clamp(region);
        let mut pixels = Vec::with_capacity(region.area() as usize * 4);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                pixels.extend_from_slice(&self.buffer.get_pixel(x, y).0);
            }
        }
        PixelPatch { region, pixels }
    }

    /// Write a patch back. Returns the region that changed.
    pub(crate) fn restore(&mut self, patch: &PixelPatch) -> PixelRect {
        let region = patch.region;
        let mut written = PixelRect::EMPTY;
        for (i, chunk) in patch.pixels.chunks_exact(4).enumerate() {
            let x = region.x + (i as u32 % region.width.max(1));
            let y = region.y + (i as u32 / region.width.max(1));
            if x < self.width() && y < self.height() {
                self.buffer.put_pixel(x, y, Rgba([chunk[0], chunk[1], chunk[2], chunk[3]]));
            }
        }
        if !region.is_empty() {
            written = self.clamp(region);
        }
        self.version += 1;
        written
    }

    /// Fill the whole buffer with the background color.
    pub(crate) fn clear(&mut self) -> PixelRect {
        let background = to_rgba(self.background);
        for pixel in self.buffer.pixels_mut() {
            *pixel = background;
        }
        self.version += 1;
        self.full_rect()
    }

    /// Rasterize a stroke as a chain of round capsules.
    ///
    /// Coverage of overlapping segments is combined with `max` and blended once, so a
    /// stroke never darkens where it crosses itself.
    pub(crate) fn paint_stroke(&mut self, stroke: &Stroke) -> PixelRect {
        let region = self.stroke_region(stroke);
        if region.is_empty() {
            return region;
        }

        let brush = stroke.brush();
        let mut mask = vec![0.0f32; region.area() as usize];
        let points = stroke.points();
        let segments: Vec<(Pos2, Pos2)> = if points.len() == 1 {
            vec![(points[0], points[0])]
        } else {
            points.windows(2).map(|w| (w[0], w[1])).collect()
        };

        for (a, b) in segments {
            let bounds = geometry::calculate_bounds(&[a, b], brush.radius() + 1.0);
            let segment_rect = PixelRect::from_rect_clamped(bounds, self.width(), self.height());
            for y in segment_rect.y..segment_rect.bottom() {
                for x in segment_rect.x..segment_rect.right() {
                    let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let strength = brush.falloff(geometry::distance_to_line_segment(center, a, b));
                    if strength > 0.0 {
                        let idx = ((y - region.y) * region.width + (x - region.x)) as usize;
                        mask[idx] = mask[idx].max(strength);
                    }
                }
            }
        }

        let color = to_rgba(stroke.paint_color(self.background));
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                let strength = mask[((y - region.y) * region.width + (x - region.x)) as usize];
                if strength > 0.0 {
                    let coverage = strength * brush.tint(x, y);
                    self.blend(x, y, color, coverage);
                }
            }
        }

        self.version += 1;
        region
    }

    /// Fill a lasso polygon. Returns the shape's square region.
    pub(crate) fn fill_shape(&mut self, shape: &Shape) -> PixelRect {
        let region = self.clamp(shape.region());
        let color = to_rgba(shape.color());
        for (y, start, end) in geometry::fill_spans(shape.points(), region) {
            for x in start..end {
                self.blend(x, y, color, 1.0);
            }
        }
        self.version += 1;
        region
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba<u8>, coverage: f32) {
        let alpha = (coverage * color.0[3] as f32 / 255.0).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = self.buffer.get_pixel_mut(x, y);
        for channel in 0..3 {
            let value = color.0[channel] as f32 * alpha + dst.0[channel] as f32 * (1.0 - alpha);
            dst.0[channel] = value.round() as u8;
        }
        let out_alpha = 255.0 * alpha + dst.0[3] as f32 * (1.0 - alpha);
        dst.0[3] = out_alpha.round() as u8;
    }

    /// The part of `region` that lies on the canvas
    pub(crate) fn clamp(&self, region: PixelRect) -> PixelRect {
        let x = region.x.min(self.width());
        let y = region.y.min(self.height());
        let right = region.right().min(self.width());
        let bottom = region.bottom().min(self.height());
        PixelRect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }
}

pub(crate) fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// A rectangle of saved RGBA pixels
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPatch {
    region: PixelRect,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for PixelPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelPatch")
            .field("region", &self.region)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl PixelPatch {
    /// Build a patch from a full image placed at the canvas origin.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            region: PixelRect::full(image.width(), image.height()),
            pixels: image.as_raw().clone(),
        }
    }

    pub fn region(&self) -> PixelRect {
        self.region
    }

    /// Bytes held by the patch
    pub fn memory_size(&self) -> usize {
        self.pixels.len()
    }

    /// A patch is consistent when it holds exactly four bytes per pixel of its region.
    pub fn is_consistent(&self) -> bool {
        self.pixels.len() as u64 == self.region.area() * 4
    }
}

/// Read-only view of the canvas at one point in time
#[derive(Clone, Debug)]
pub struct CanvasSnapshot {
    image: Arc<RgbaImage>,
    version: u64,
}

impl CanvasSnapshot {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Another handle to the same pixels, without copying them
    pub fn shared_image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Canvas version the snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Copy out a region, e.g. the square region of a lasso shape.
    pub fn crop(&self, region: PixelRect) -> RgbaImage {
        image::imageops::crop_imm(self.image.as_ref(), region.x, region.y, region.width, region.height)
            .to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSettings;
    use crate::stroke::StrokeMode;

    #[test]
    fn test_new_canvas_is_blank() {
        let canvas = Canvas::new(16, 8, Color32::BLACK);
        assert!(canvas.is_blank());
        assert_eq!(canvas.size(), [16, 8]);
        assert_eq!(canvas.pixel(15, 7), Some(Color32::BLACK));
        assert_eq!(canvas.pixel(16, 0), None);
    }

    #[test]
    fn test_capture_restore() {
        let mut canvas = Canvas::new(32, 32, Color32::BLACK);
        let region = PixelRect::new(4, 4, 8, 8);
        let patch = canvas.capture(region);
        assert!(patch.is_consistent());

        let stroke = Stroke::new(
            StrokeMode::Draw,
            Color32::WHITE,
            BrushSettings::default(),
            vec![Pos2::new(8.0, 8.0)],
        );
        canvas.paint_stroke(&stroke);
        assert!(!canvas.is_blank());

        canvas.restore(&patch);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_soft_stroke_is_blended() {
        let mut canvas = Canvas::new(32, 32, Color32::BLACK);
        let brush = BrushSettings::new(crate::brush::BrushTexture::Solid, 10.0, 1.0, 0.5);
        let stroke = Stroke::new(StrokeMode::Draw, Color32::WHITE, brush, vec![Pos2::new(16.0, 16.0)]);
        canvas.paint_stroke(&stroke);
        let pixel = canvas.pixel(16, 16).unwrap();
        assert!((126..=129).contains(&pixel.r()));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut canvas = Canvas::new(8, 8, Color32::BLACK);
        let snapshot = canvas.render();
        canvas.paint_stroke(&Stroke::new(
            StrokeMode::Draw,
            Color32::WHITE,
            BrushSettings::default(),
            vec![Pos2::new(4.0, 4.0)],
        ));
        assert!(snapshot.image().pixels().all(|p| p.0 == [0, 0, 0, 255]));
        assert_eq!(snapshot.crop(PixelRect::new(0, 0, 4, 2)).dimensions(), (4, 2));
    }
}
