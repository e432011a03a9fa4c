use std::path::PathBuf;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::brush::BrushSettings;
use crate::canvas::Canvas;
use crate::generation::{GenerationConfig, ProcessBackend, PromptParts};
use crate::tools::ToolController;

pub const BACKEND_ENV: &str = "DOODLEPIX_BACKEND";
pub const MODEL_ENV: &str = "DOODLEPIX_MODEL";

/// How to start the external pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Drawings and results are exchanged here
    pub work_dir: PathBuf,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("doodlepix-pipeline"),
            args: Vec::new(),
            work_dir: std::env::temp_dir().join("doodlepix"),
        }
    }
}

impl BackendSettings {
    pub fn build(&self) -> ProcessBackend {
        ProcessBackend::new(self.program.clone(), self.args.clone(), self.work_dir.clone())
    }
}

/// User settings kept between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Color32,
    pub color: Color32,
    pub brush: BrushSettings,
    pub generation: GenerationConfig,
    pub prompt_parts: PromptParts,
    pub backend: BackendSettings,
    pub min_sample_distance: f32,
    /// Undo steps kept, `None` for unbounded
    pub history_limit: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: Canvas::DEFAULT_SIZE,
            canvas_height: Canvas::DEFAULT_SIZE,
            background: Color32::BLACK,
            color: Color32::WHITE,
            brush: BrushSettings::default(),
            generation: GenerationConfig::default(),
            prompt_parts: PromptParts::default(),
            backend: BackendSettings::default(),
            min_sample_distance: ToolController::DEFAULT_MIN_SAMPLE_DISTANCE,
            history_limit: Some(200),
        }
    }
}

impl Settings {
    /// Apply `DOODLEPIX_BACKEND` and `DOODLEPIX_MODEL` from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var_os(name).map(PathBuf::from));
    }

    /// Apply overrides from any lookup, e.g. a map in tests
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<PathBuf>) {
        if let Some(program) = lookup(BACKEND_ENV).filter(|p| !p.as_os_str().is_empty()) {
            log::info!("backend program from {BACKEND_ENV}: {}", program.display());
            self.backend.program = program;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|p| !p.as_os_str().is_empty()) {
            log::info!("model path from {MODEL_ENV}: {}", model.display());
            self.generation.model_path = model;
        }
    }

    pub fn canvas_size(&self) -> [u32; 2] {
        [self.canvas_width.max(1), self.canvas_height.max(1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_settings_get_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"canvas_width": 256}"#).unwrap();
        assert_eq!(settings.canvas_width, 256);
        assert_eq!(settings.canvas_height, Canvas::DEFAULT_SIZE);
        assert_eq!(settings.generation.steps, 20);
    }

    #[test]
    fn test_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|name| match name {
            MODEL_ENV => Some(PathBuf::from("/models/doodlepix")),
            BACKEND_ENV => Some(PathBuf::new()),
            _ => None,
        });
        assert_eq!(settings.generation.model_path, PathBuf::from("/models/doodlepix"));
        assert_eq!(settings.backend.program, PathBuf::from("doodlepix-pipeline"));
    }
}
