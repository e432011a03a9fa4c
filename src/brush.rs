use serde::{Deserialize, Serialize};

/// Texture applied on top of the round brush footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushTexture {
    #[default]
    Solid,
    Grain,
    Hatch,
    Stipple,
}

impl BrushTexture {
    pub const ALL: [BrushTexture; 4] = [
        BrushTexture::Solid,
        BrushTexture::Grain,
        BrushTexture::Hatch,
        BrushTexture::Stipple,
    ];

    /// Stable numeric id of the texture
    pub fn id(self) -> u8 {
        match self {
            Self::Solid => 0,
            Self::Grain => 1,
            Self::Hatch => 2,
            Self::Stipple => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|texture| texture.id() == id)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Grain => "Grain",
            Self::Hatch => "Hatch",
            Self::Stipple => "Stipple",
        }
    }

    /// Mask value in `0.0..=1.0` at a canvas pixel. Depends only on the pixel position,
    /// so replaying a stroke always produces the same pixels.
    pub fn sample(self, x: u32, y: u32) -> f32 {
        match self {
            Self::Solid => 1.0,
            Self::Grain => 0.55 + 0.45 * pixel_noise(x, y),
            Self::Hatch => {
                if (x + y) % 4 < 2 {
                    1.0
                } else {
                    0.35
                }
            }
            Self::Stipple => {
                if pixel_noise(x, y) < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn pixel_noise(x: u32, y: u32) -> f32 {
    let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65535.0
}

/// Brush parameters consulted when a new stroke is started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub texture: BrushTexture,
    /// Diameter in canvas pixels
    pub size: f32,
    /// Fraction of the radius painted at full strength, `0.0..=1.0`
    pub hardness: f32,
    pub opacity: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            texture: BrushTexture::Solid,
            size: 5.0,
            hardness: 1.0,
            opacity: 1.0,
        }
    }
}

impl BrushSettings {
    pub const MIN_SIZE: f32 = 1.0;
    pub const MAX_SIZE: f32 = 100.0;

    pub fn new(texture: BrushTexture, size: f32, hardness: f32, opacity: f32) -> Self {
        Self {
            texture,
            size,
            hardness,
            opacity,
        }
        .sanitized()
    }

    /// Clamp every parameter into its valid range. Non-finite values fall back to defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, min: f32, max: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };
        Self {
            texture: self.texture,
            size: clamp(self.size, Self::MIN_SIZE, Self::MAX_SIZE, defaults.size),
            hardness: clamp(self.hardness, 0.0, 1.0, defaults.hardness),
            opacity: clamp(self.opacity, 0.0, 1.0, defaults.opacity),
        }
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size;
        *self = self.sanitized();
    }

    pub fn set_hardness(&mut self, hardness: f32) {
        self.hardness = hardness;
        *self = self.sanitized();
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        *self = self.sanitized();
    }

    pub fn radius(&self) -> f32 {
        self.size * 0.5
    }

    /// Footprint strength at `distance` from the stroke center line, before opacity and
    /// texture are applied.
    pub fn falloff(&self, distance: f32) -> f32 {
        let radius = self.radius();
        let core = radius * self.hardness;
        if distance <= core {
            1.0
        } else if distance >= radius {
            0.0
        } else {
            (radius - distance) / (radius - core)
        }
    }

    /// Opacity times texture at a canvas pixel; multiplied with the footprint strength.
    pub fn tint(&self, x: u32, y: u32) -> f32 {
        self.opacity * self.texture.sample(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_are_clamped() {
        let brush = BrushSettings::new(BrushTexture::Grain, 500.0, 1.5, -0.2);
        assert_eq!(brush.size, BrushSettings::MAX_SIZE);
        assert_eq!(brush.hardness, 1.0);
        assert_eq!(brush.opacity, 0.0);

        let brush = BrushSettings::new(BrushTexture::Solid, f32::NAN, 0.5, 0.5);
        assert_eq!(brush.size, BrushSettings::default().size);
    }

    #[test]
    fn test_falloff() {
        let hard = BrushSettings::new(BrushTexture::Solid, 10.0, 1.0, 1.0);
        assert_eq!(hard.falloff(4.9), 1.0);
        assert_eq!(hard.falloff(5.1), 0.0);

        let soft = BrushSettings::new(BrushTexture::Solid, 10.0, 0.0, 1.0);
        assert!((soft.falloff(2.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_texture_ids_round_trip() {
        for texture in BrushTexture::ALL {
            assert_eq!(BrushTexture::from_id(texture.id()), Some(texture));
        }
        assert_eq!(BrushTexture::from_id(42), None);
    }

    #[test]
    fn test_texture_is_deterministic() {
        for texture in BrushTexture::ALL {
            let a = texture.sample(17, 230);
            assert_eq!(a, texture.sample(17, 230));
            assert!((0.0..=1.0).contains(&a));
        }
    }
}
