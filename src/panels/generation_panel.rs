use crate::DoodlePixApp;
use crate::error::{ConfigError, GenerationError};
use crate::generation::{GenerationConfig, GenerationField, GenerationState, Perspective, PromptParts, Scheduler};
use crate::renderer::fit_size;

/// Generation controls and the generating viewport
pub fn generation_panel(app: &mut DoodlePixApp, ctx: &egui::Context) {
    egui::SidePanel::right("generation_panel")
        .resizable(true)
        .default_width(340.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Generation");

                let field_error = match app.session().generation().last_error() {
                    Some(GenerationError::InvalidConfig(e)) => Some(e.clone()),
                    _ => None,
                };
                let (session, settings, _) = app.parts();
                let config = session.config_mut();
                if config_controls(ui, config, &mut settings.prompt_parts, field_error.as_ref()) {
                    session.generation_mut().clear_error();
                }
                ui.separator();

                generate_controls(ui, app);
                ui.separator();

                result_view(ui, ctx, app);
            });
        });
}

/// Returns true when any value changed
fn config_controls(
    ui: &mut egui::Ui,
    config: &mut GenerationConfig,
    parts: &mut PromptParts,
    error: Option<&ConfigError>,
) -> bool {
    let mut changed = false;
    let show_error = |ui: &mut egui::Ui, field: GenerationField| {
        if let Some(e) = error.filter(|e| e.field() == field) {
            ui.colored_label(ui.visuals().error_fg_color, e.to_string());
        }
    };

    ui.label("Model:");
    ui.horizontal(|ui| {
        let mut path = config.model_path.display().to_string();
        if ui.text_edit_singleline(&mut path).changed() {
            config.model_path = path.into();
            changed = true;
        }
        if ui.button("Browse…").clicked() {
            if let Some(folder) = rfd::FileDialog::new().pick_folder() {
                config.model_path = folder;
                changed = true;
            }
        }
    });
    show_error(ui, GenerationField::ModelPath);

    ui.collapsing("Prompt builder", |ui| {
        ui.add(egui::Slider::new(&mut parts.fidelity, 0..=PromptParts::MAX_FIDELITY).text("Fidelity"));
        ui.horizontal(|ui| {
            for perspective in Perspective::ALL {
                ui.radio_value(&mut parts.perspective, perspective, perspective.token());
            }
        });
        ui.horizontal(|ui| {
            ui.label("Tags:");
            ui.text_edit_singleline(&mut parts.tags);
        });
        ui.horizontal(|ui| {
            ui.label("Colors:");
            ui.text_edit_singleline(&mut parts.colors);
        });
        if ui.button("Use as prompt").clicked() {
            config.prompt = parts.compose();
            changed = true;
        }
    });

    ui.label("Prompt:");
    changed |= ui
        .add(egui::TextEdit::multiline(&mut config.prompt).desired_rows(3))
        .changed();
    ui.label("Negative prompt:");
    changed |= ui
        .add(egui::TextEdit::multiline(&mut config.negative_prompt).desired_rows(2))
        .changed();

    egui::ComboBox::from_label("Scheduler")
        .selected_text(config.scheduler.name())
        .show_ui(ui, |ui| {
            for scheduler in Scheduler::ALL {
                changed |= ui
                    .selectable_value(&mut config.scheduler, scheduler, scheduler.name())
                    .changed();
            }
        });

    ui.horizontal(|ui| {
        ui.label("Steps:");
        changed |= ui.add(egui::DragValue::new(&mut config.steps).range(0..=150)).changed();
    });
    show_error(ui, GenerationField::Steps);

    ui.horizontal(|ui| {
        ui.label("Guidance:");
        changed |= ui
            .add(egui::DragValue::new(&mut config.guidance_scale).speed(0.1).range(0.0..=30.0))
            .changed();
    });
    show_error(ui, GenerationField::GuidanceScale);

    ui.horizontal(|ui| {
        ui.label("Image guidance:");
        changed |= ui
            .add(egui::DragValue::new(&mut config.image_guidance_scale).speed(0.05).range(0.0..=10.0))
            .changed();
    });
    show_error(ui, GenerationField::ImageGuidanceScale);

    ui.horizontal(|ui| {
        ui.label("Seed (-1 = random):");
        let mut seed = config.seed_input();
        if ui
            .add(egui::DragValue::new(&mut seed).range(-1..=GenerationConfig::MAX_SEED as i64))
            .changed()
        {
            config.set_seed_input(seed);
            changed = true;
        }
    });
    show_error(ui, GenerationField::Seed);

    changed |= ui.checkbox(&mut config.reload_pipeline, "Reload pipeline").changed();
    changed
}

fn generate_controls(ui: &mut egui::Ui, app: &mut DoodlePixApp) {
    let state = app.session().generation().state();
    ui.horizontal(|ui| {
        let idle = state == GenerationState::Idle;
        if ui.add_enabled(idle, egui::Button::new("Generate")).clicked() {
            app.run_action(crate::shortcuts::Action::Generate);
        }
        if ui.add_enabled(!idle, egui::Button::new("Cancel")).clicked() {
            app.session_mut().cancel_generation();
        }
        if let GenerationState::Requesting { started_at, .. } = state {
            ui.spinner();
            let elapsed = crate::util::time::current_time_secs() - started_at;
            ui.label(format!("Generating… {elapsed:.0}s"));
        }
    });

    if let Some(GenerationError::Backend(e)) = app.session().generation().last_error() {
        ui.colored_label(ui.visuals().error_fg_color, e.to_string());
    }
}

fn result_view(ui: &mut egui::Ui, ctx: &egui::Context, app: &mut DoodlePixApp) {
    let (session, _, renderer) = app.parts();
    let images = session.images();

    let Some(current) = images.current() else {
        renderer.clear_result();
        ui.label("No images generated yet");
        return;
    };

    let texture = renderer.result_texture(ctx, current);
    let size = egui::vec2(current.image.width() as f32, current.image.height() as f32);
    let available = egui::vec2(ui.available_width(), ui.available_width());
    ui.image((texture, fit_size(size, available)));
    ui.label(format!(
        "seed {} · {} · {} steps",
        current.config.seed.unwrap_or_default(),
        current.config.scheduler,
        current.config.steps
    ));

    let position = images.position().unwrap_or_default() + 1;
    let total = images.len();
    let can_previous = images.can_go_previous();
    let can_next = images.can_go_next();
    ui.horizontal(|ui| {
        if ui.add_enabled(can_previous, egui::Button::new("◀")).clicked() {
            app.session_mut().previous_image();
        }
        ui.label(format!("{position} / {total}"));
        if ui.add_enabled(can_next, egui::Button::new("▶")).clicked() {
            app.session_mut().next_image();
        }
        if ui.button("Save…").clicked() {
            app.save_current_image();
        }
        if ui.button("Delete").clicked() {
            app.session_mut().delete_current_image();
        }
    });
}
