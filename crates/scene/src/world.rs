use foundation::Rgba;
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::lights::{Fog, LightRig};
use crate::prefabs::globe::Globe;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// `None` leaves the canvas transparent.
    pub background: Option<Rgba>,
    pub lights: LightRig,
    pub fog: Option<Fog>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            background: Some(Rgba::WHITE),
            lights: LightRig::default(),
            fog: None,
        }
    }
}

/// The fixed scene graph: environment, lights and the single globe at the origin.
#[derive(Debug)]
pub struct Scene {
    pub background: Option<Rgba>,
    pub lights: LightRig,
    pub fog: Option<Fog>,
    pub globe: Globe,
}

impl Scene {
    pub const ORIGIN: Vec3 = Vec3::ZERO;

    pub fn new(settings: &SceneSettings, globe: Globe) -> Self {
        Self {
            background: settings.background,
            lights: settings.lights.clone().clamped(),
            fog: settings.fog,
            globe,
        }
    }

    pub fn clear_color(&self) -> Rgba {
        self.background.unwrap_or(Rgba::new(0.0, 0.0, 0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{Scene, SceneSettings};
    use crate::prefabs::globe::{Globe, GlobeStyle};
    use foundation::Rgba;

    #[test]
    fn transparent_background_clears_to_zero_alpha() {
        let settings = SceneSettings {
            background: None,
            ..SceneSettings::default()
        };
        let scene = Scene::new(&settings, Globe::new(GlobeStyle::default()));
        assert_eq!(scene.clear_color().a, 0.0);
        let scene = Scene::new(&SceneSettings::default(), Globe::new(GlobeStyle::default()));
        assert_eq!(scene.clear_color(), Rgba::WHITE);
    }

    #[test]
    fn settings_accept_partial_json() {
        let settings: SceneSettings =
            serde_json::from_str(r##"{"background":"#0b0e1a","fog":{"color":"#fff","near":400,"far":2000}}"##)
                .expect("parse");
        assert_eq!(settings.background, Some(Rgba::from_rgb_u32(0x0b0e1a)));
        assert_eq!(settings.fog.map(|f| f.far), Some(2000.0));
        assert_eq!(settings.lights, SceneSettings::default().lights);
    }
}
