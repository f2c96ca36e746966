use foundation::Rgba;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Rgba,
    pub intensity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Rgba,
    pub intensity: f32,
    /// Light shines from here towards the origin.
    pub position: [f64; 3],
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Rgba,
    pub intensity: f32,
    pub position: [f64; 3],
}

/// Upper bounds shared with the shader's light arrays.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub directional: Vec<DirectionalLight>,
    pub point: Vec<PointLight>,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Rgba::WHITE,
                intensity: 0.6,
            },
            directional: Vec::new(),
            point: Vec::new(),
        }
    }
}

impl LightRig {
    /// Lights beyond the shader limits are dropped with a warning.
    pub fn clamped(mut self) -> Self {
        if self.directional.len() > MAX_DIRECTIONAL_LIGHTS {
            tracing::warn!(count = self.directional.len(), "too many directional lights, extra ignored");
            self.directional.truncate(MAX_DIRECTIONAL_LIGHTS);
        }
        if self.point.len() > MAX_POINT_LIGHTS {
            tracing::warn!(count = self.point.len(), "too many point lights, extra ignored");
            self.point.truncate(MAX_POINT_LIGHTS);
        }
        self
    }
}

/// Linear depth fog between `near` and `far` camera distances.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub color: Rgba,
    pub near: f64,
    pub far: f64,
}
