use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Sampling algorithm used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scheduler {
    #[default]
    #[serde(rename = "DDIM")]
    Ddim,
    #[serde(rename = "DDPM")]
    Ddpm,
    #[serde(rename = "PNDM")]
    Pndm,
    #[serde(rename = "Euler Ancestral")]
    EulerAncestral,
    #[serde(rename = "DPM++ 2M")]
    DpmPlusPlus2M,
}

impl Scheduler {
    pub const ALL: [Scheduler; 5] = [
        Scheduler::Ddim,
        Scheduler::Ddpm,
        Scheduler::Pndm,
        Scheduler::EulerAncestral,
        Scheduler::DpmPlusPlus2M,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ddim => "DDIM",
            Self::Ddpm => "DDPM",
            Self::Pndm => "PNDM",
            Self::EulerAncestral => "Euler Ancestral",
            Self::DpmPlusPlus2M => "DPM++ 2M",
        }
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies the control a configuration error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationField {
    ModelPath,
    Steps,
    GuidanceScale,
    ImageGuidanceScale,
    Seed,
}

/// Parameters of one generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model_path: PathBuf,
    pub prompt: String,
    pub negative_prompt: String,
    pub scheduler: Scheduler,
    pub steps: u32,
    pub guidance_scale: f32,
    pub image_guidance_scale: f32,
    /// `None` picks a random seed per request
    pub seed: Option<u64>,
    /// Re-initialize the pipeline even if one is already loaded
    pub reload_pipeline: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            prompt: String::new(),
            negative_prompt: Self::DEFAULT_NEGATIVE_PROMPT.to_owned(),
            scheduler: Scheduler::default(),
            steps: 20,
            guidance_scale: 7.5,
            image_guidance_scale: 1.5,
            seed: None,
            reload_pipeline: false,
        }
    }
}

impl GenerationConfig {
    pub const DEFAULT_NEGATIVE_PROMPT: &'static str = "NSFW, bad quality, blurry";
    pub const MIN_STEPS: u32 = 1;
    pub const MAX_STEPS: u32 = 100;
    pub const MIN_GUIDANCE: f32 = 1.0;
    pub const MAX_GUIDANCE: f32 = 20.0;
    pub const MIN_IMAGE_GUIDANCE: f32 = 0.0;
    pub const MAX_IMAGE_GUIDANCE: f32 = 5.0;
    pub const MAX_SEED: u64 = 999_999;

    /// Check every field, reporting the first offending one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingModelPath);
        }
        if !(Self::MIN_STEPS..=Self::MAX_STEPS).contains(&self.steps) {
            return Err(ConfigError::Steps {
                value: self.steps,
                min: Self::MIN_STEPS,
                max: Self::MAX_STEPS,
            });
        }
        if !(Self::MIN_GUIDANCE..=Self::MAX_GUIDANCE).contains(&self.guidance_scale) {
            return Err(ConfigError::GuidanceScale {
                value: self.guidance_scale,
                min: Self::MIN_GUIDANCE,
                max: Self::MAX_GUIDANCE,
            });
        }
        if !(Self::MIN_IMAGE_GUIDANCE..=Self::MAX_IMAGE_GUIDANCE).contains(&self.image_guidance_scale) {
            return Err(ConfigError::ImageGuidanceScale {
                value: self.image_guidance_scale,
                min: Self::MIN_IMAGE_GUIDANCE,
                max: Self::MAX_IMAGE_GUIDANCE,
            });
        }
        if let Some(seed) = self.seed {
            if seed > Self::MAX_SEED {
                return Err(ConfigError::Seed {
                    value: seed,
                    max: Self::MAX_SEED,
                });
            }
        }
        Ok(())
    }

    /// Seed as shown in the seed field, -1 meaning random
    pub fn seed_input(&self) -> i64 {
        self.seed.map_or(-1, |seed| seed as i64)
    }

    pub fn set_seed_input(&mut self, value: i64) {
        self.seed = u64::try_from(value).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GenerationConfig {
        GenerationConfig {
            model_path: PathBuf::from("models/doodlepix"),
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert_eq!(valid().validate(), Ok(()));
        assert_eq!(
            GenerationConfig::default().validate(),
            Err(ConfigError::MissingModelPath)
        );
    }

    #[test]
    fn test_errors_name_their_field() {
        let mut config = valid();
        config.steps = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), GenerationField::Steps);

        let mut config = valid();
        config.guidance_scale = f32::NAN;
        assert_eq!(config.validate().unwrap_err().field(), GenerationField::GuidanceScale);

        let mut config = valid();
        config.image_guidance_scale = 5.5;
        assert_eq!(config.validate().unwrap_err().field(), GenerationField::ImageGuidanceScale);

        let mut config = valid();
        config.seed = Some(1_000_000);
        assert_eq!(config.validate().unwrap_err().field(), GenerationField::Seed);
    }

    #[test]
    fn test_seed_input() {
        let mut config = valid();
        config.set_seed_input(-1);
        assert_eq!(config.seed, None);
        config.set_seed_input(42);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.seed_input(), 42);
    }

    #[test]
    fn test_scheduler_serde_names() {
        let json = serde_json::to_string(&Scheduler::EulerAncestral).unwrap();
        assert_eq!(json, "\"Euler Ancestral\"");
        let back: Scheduler = serde_json::from_str("\"DPM++ 2M\"").unwrap();
        assert_eq!(back, Scheduler::DpmPlusPlus2M);
    }
}
