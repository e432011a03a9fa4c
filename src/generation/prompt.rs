use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Flat,
    #[serde(rename = "3d")]
    ThreeD,
    #[default]
    Normal,
    Outline,
}

impl Perspective {
    pub const ALL: [Perspective; 4] = [
        Perspective::Flat,
        Perspective::ThreeD,
        Perspective::Normal,
        Perspective::Outline,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::ThreeD => "3d",
            Self::Normal => "normal",
            Self::Outline => "outline",
        }
    }
}

/// Structured prompt pieces composed into the pipeline's prompt syntax
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptParts {
    /// 0 (loose) to 9 (faithful to the drawing)
    pub fidelity: u8,
    pub perspective: Perspective,
    pub tags: String,
    pub colors: String,
}

impl Default for PromptParts {
    fn default() -> Self {
        Self {
            fidelity: 5,
            perspective: Perspective::default(),
            tags: String::new(),
            colors: String::new(),
        }
    }
}

impl PromptParts {
    pub const MAX_FIDELITY: u8 = 9;

    /// Compose e.g. `f5, [normal], <tags:cat, hat, red, wool`. Empty parts are skipped.
    pub fn compose(&self) -> String {
        let mut parts = vec![
            format!("f{}", self.fidelity.min(Self::MAX_FIDELITY)),
            format!("[{}]", self.perspective.token()),
        ];
        let tags = self.tags.trim();
        if !tags.is_empty() {
            parts.push(format!("<tags:{}", tags.to_lowercase()));
        }
        let colors = self.colors.trim();
        if !colors.is_empty() {
            parts.push(colors.to_lowercase());
        }
        parts.join(", ")
    }
}
