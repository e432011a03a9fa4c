use crate::DoodlePixApp;

/// The drawing viewport
pub fn central_panel(app: &mut DoodlePixApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas_rect = ui.available_rect_before_wrap();
        let (response, painter) = ui.allocate_painter(canvas_rect.size(), egui::Sense::drag());

        // Pointer input is routed through the input handler; it needs this frame's rect
        app.input_mut().set_canvas_rect(response.rect);

        let (session, _, renderer) = app.parts();
        let dirty = session.take_dirty_region();
        session.tools_mut().set_viewport_origin(response.rect.min);
        renderer.sync_canvas(ctx, session.canvas(), dirty);
        renderer.draw_canvas(&painter, session.canvas(), session.tools());

        if session.tools().is_busy() {
            ctx.request_repaint();
        }
    });
}
