use egui::Pos2;

use super::PixelRect;

/// Horizontal runs of pixels whose centers lie inside a closed polygon (even-odd rule).
///
/// Each span is `(y, x_start, x_end)` with `x_end` exclusive. The last point connects back
/// to the first, so callers do not need to close the polygon themselves. Only rows and
/// columns inside `clip` are produced.
pub fn fill_spans(polygon: &[Pos2], clip: PixelRect) -> Vec<(u32, u32, u32)> {
    let mut spans = Vec::new();
    if polygon.len() < 3 || clip.is_empty() {
        return spans;
    }

    let mut crossings: Vec<f32> = Vec::with_capacity(8);
    for y in clip.y..clip.bottom() {
        let center_y = y as f32 + 0.5;
        crossings.clear();

        for (i, a) in polygon.iter().enumerate() {
            let b = polygon[(i + 1) % polygon.len()];
            if (a.y <= center_y) != (b.y <= center_y) {
                let t = (center_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }
        crossings.sort_by(f32::total_cmp);

        for pair in crossings.chunks_exact(2) {
            // A pixel is inside when its center x + 0.5 falls in [pair[0], pair[1]).
            let start = (pair[0] - 0.5).ceil().max(clip.x as f32);
            let end = (pair[1] - 0.5).ceil().min(clip.right() as f32);
            if end > start {
                spans.push((y, start as u32, end as u32));
            }
        }
    }

    spans
}
