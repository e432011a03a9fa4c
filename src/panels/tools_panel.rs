use egui::color_picker::{self, Alpha};

use crate::DoodlePixApp;
use crate::brush::{BrushSettings, BrushTexture};
use crate::tools::ToolMode;

pub fn tools_panel(app: &mut DoodlePixApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let active = app.session().tools().mode();
            ui.horizontal_wrapped(|ui| {
                for mode in ToolMode::ALL {
                    if ui.selectable_label(active == mode, mode.label()).clicked() {
                        app.session_mut().set_mode(mode);
                    }
                }
            });
            if ui.button("Toggle eraser").clicked() {
                app.session_mut().toggle_eraser();
            }
            ui.separator();

            // Color picker
            ui.horizontal(|ui| {
                ui.label("Color:");
                let mut color = app.session().tools().color();
                if color_picker::color_edit_button_srgba(ui, &mut color, Alpha::Opaque).changed() {
                    app.session_mut().set_color(color);
                }
            });

            brush_controls(ui, app.session_mut().tools_mut().brush_mut());
            ui.separator();

            // Undo/Redo section
            ui.horizontal(|ui| {
                let can_undo = app.session().history().can_undo();
                let can_redo = app.session().history().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    let _ = app.session_mut().undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    let _ = app.session_mut().redo();
                }
                if ui.button("Clear").clicked() {
                    app.session_mut().clear();
                }
            });

            ui.horizontal(|ui| {
                if ui.button("Open…").clicked() {
                    app.open_drawing();
                }
                if ui.button("Save…").clicked() {
                    app.save_drawing_as();
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Save session…").clicked() {
                    if let Some(path) = DoodlePixApp::pick_session_file(true) {
                        app.save_snapshot(&path);
                    }
                }
                if ui.button("Restore session…").clicked() {
                    if let Some(path) = DoodlePixApp::pick_session_file(false) {
                        app.restore_snapshot(&path);
                    }
                }
            });
            if ui.button("Reset view").clicked() {
                app.session_mut().tools_mut().reset_view();
            }
            ui.separator();

            let history = app.session().history();
            ui.label(format!(
                "Undo: {}  Redo: {}  ({} KiB)",
                history.undo_len(),
                history.redo_len(),
                history.memory_size() / 1024
            ));
            egui::ScrollArea::vertical()
                .max_height(200.0)
                .show(ui, |ui| {
                    egui::Grid::new("command_history_grid")
                        .num_columns(2)
                        .spacing([40.0, 4.0])
                        .striped(true)
                        .show(ui, |ui| {
                            ui.strong("Undo Stack");
                            ui.strong("Redo Stack");
                            ui.end_row();

                            let applied: Vec<_> = history.applied_commands().collect();
                            let undone = history.undone_commands();
                            for i in 0..applied.len().max(undone.len()) {
                                ui.label(applied.get(i).map_or("", |c| c.label()));
                                ui.label(undone.get(i).map_or("", |c| c.label()));
                                ui.end_row();
                            }
                        });
                });

            if let Some(status) = app.status() {
                ui.separator();
                ui.label(status);
            }
        });
}

fn brush_controls(ui: &mut egui::Ui, brush: &mut BrushSettings) {
    egui::ComboBox::from_label("Texture")
        .selected_text(brush.texture.label())
        .show_ui(ui, |ui| {
            for texture in BrushTexture::ALL {
                ui.selectable_value(&mut brush.texture, texture, texture.label());
            }
        });

    let mut size = brush.size;
    if ui
        .add(egui::Slider::new(&mut size, BrushSettings::MIN_SIZE..=BrushSettings::MAX_SIZE).text("Size"))
        .changed()
    {
        brush.set_size(size);
    }
    let mut hardness = brush.hardness;
    if ui.add(egui::Slider::new(&mut hardness, 0.0..=1.0).text("Hardness")).changed() {
        brush.set_hardness(hardness);
    }
    let mut opacity = brush.opacity;
    if ui.add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity")).changed() {
        brush.set_opacity(opacity);
    }
}
