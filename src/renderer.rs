use egui::{
    Color32, ColorImage, Context, Painter, Pos2, Rect, Stroke as LineStroke, TextureHandle,
    TextureId, TextureOptions, Vec2,
};
use image::RgbaImage;
use uuid::Uuid;

use crate::canvas::Canvas;
use crate::geometry::PixelRect;
use crate::image_history::GeneratedImage;
use crate::tools::{ToolController, ToolPreview};

/// Keeps GPU textures for the canvas and the selected result in sync
#[derive(Default)]
pub struct Renderer {
    canvas_texture: Option<TextureHandle>,
    canvas_size: [u32; 2],
    result_texture: Option<(Uuid, TextureHandle)>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("canvas_size", &self.canvas_size)
            .field("has_canvas_texture", &self.canvas_texture.is_some())
            .field("result", &self.result_texture.as_ref().map(|(id, _)| *id))
            .finish()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the changed part of the canvas, or all of it on first use or resize.
    pub fn sync_canvas(&mut self, ctx: &Context, canvas: &Canvas, dirty: Option<PixelRect>) {
        if self.canvas_texture.is_none() || self.canvas_size != canvas.size() {
            let image = color_image(canvas.pixels(), canvas.full_rect());
            self.canvas_texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            self.canvas_size = canvas.size();
            return;
        }

        let (Some(texture), Some(region)) = (&mut self.canvas_texture, dirty.filter(|r| !r.is_empty()))
        else {
            return;
        };
        texture.set_partial(
            [region.x as usize, region.y as usize],
            color_image(canvas.pixels(), region),
            TextureOptions::NEAREST,
        );
    }

    /// Texture for a generated image, re-uploaded only when the selection changes
    pub fn result_texture(&mut self, ctx: &Context, image: &GeneratedImage) -> TextureId {
        match &self.result_texture {
            Some((id, texture)) if *id == image.id => texture.id(),
            _ => {
                let pixels = color_image(&image.image, PixelRect::full(image.image.width(), image.image.height()));
                let texture = ctx.load_texture(format!("result-{}", image.id), pixels, TextureOptions::LINEAR);
                let id = texture.id();
                self.result_texture = Some((image.id, texture));
                id
            }
        }
    }

    pub fn clear_result(&mut self) {
        self.result_texture = None;
    }

    /// Draw the canvas through the view transform, plus any in-progress tool work
    pub fn draw_canvas(&self, painter: &Painter, canvas: &Canvas, tools: &ToolController) {
        let origin = tools.viewport_origin();
        let view = tools.view();
        let rect = view.canvas_rect(origin, canvas.size());

        painter.rect_filled(painter.clip_rect(), 0.0, Color32::from_gray(24));
        if let Some(texture) = &self.canvas_texture {
            painter.image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        painter.rect_stroke(rect, 0.0, LineStroke::new(1.0, Color32::from_gray(90)));

        let to_screen = |p: Pos2| view.canvas_to_screen(origin, p);
        match tools.preview() {
            Some(ToolPreview::Stroke(stroke)) => {
                let color = stroke.paint_color(canvas.background());
                let width = stroke.brush().size * view.scale();
                let points: Vec<Pos2> = stroke.points().iter().copied().map(to_screen).collect();
                if let [point] = points.as_slice() {
                    painter.circle_filled(*point, width / 2.0, color);
                } else {
                    painter.add(egui::Shape::line(points, LineStroke::new(width, color)));
                }
            }
            Some(ToolPreview::Lasso { points, color }) => {
                let points: Vec<Pos2> = points.into_iter().map(to_screen).collect();
                painter.add(egui::Shape::closed_line(points, LineStroke::new(1.5, color)));
            }
            None => {}
        }
    }
}

/// Fit `size` inside `available`, keeping the aspect ratio
pub fn fit_size(size: Vec2, available: Vec2) -> Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (available.x / size.x).min(available.y / size.y).max(0.0);
    size * scale
}

fn color_image(image: &RgbaImage, region: PixelRect) -> ColorImage {
    let cropped = image::imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image();
    ColorImage::from_rgba_unmultiplied(
        [cropped.width() as usize, cropped.height() as usize],
        cropped.as_raw(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_size() {
        let fitted = fit_size(Vec2::new(512.0, 256.0), Vec2::new(256.0, 256.0));
        assert_eq!(fitted, Vec2::new(256.0, 128.0));
        assert_eq!(fit_size(Vec2::ZERO, Vec2::splat(10.0)), Vec2::ZERO);
    }

    #[test]
    fn test_color_image_region() {
        let mut image = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 255]));
        image.put_pixel(3, 2, image::Rgba([255, 255, 255, 255]));
        let patch = color_image(&image, PixelRect::new(2, 2, 2, 2));
        assert_eq!(patch.size, [2, 2]);
        assert_eq!(patch.pixels[1], Color32::WHITE);
    }
}
