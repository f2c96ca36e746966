use foundation::Rgba;
use serde::{Deserialize, Serialize};

/// Phong-style surface of the globe sphere. No environment map.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeMaterial {
    pub color: Rgba,
    pub emissive: Rgba,
    pub emissive_intensity: f32,
    pub shininess: f32,
    pub transparent: bool,
    pub opacity: f32,
}

impl Default for GlobeMaterial {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            emissive: Rgba::WHITE,
            emissive_intensity: 0.8,
            shininess: 0.2,
            transparent: true,
            opacity: 0.1,
        }
    }
}

impl GlobeMaterial {
    /// Alpha actually used when blending.
    pub fn effective_opacity(&self) -> f32 {
        if self.transparent {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Translucent shell around the globe.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    pub enabled: bool,
    pub color: Rgba,
    /// Shell thickness as a fraction of the globe radius.
    pub altitude: f64,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgba::WHITE,
            altitude: 0.03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GlobeMaterial;

    #[test]
    fn opaque_material_ignores_opacity() {
        let mut material = GlobeMaterial::default();
        assert_eq!(material.effective_opacity(), 0.1);
        material.transparent = false;
        assert_eq!(material.effective_opacity(), 1.0);
    }
}
