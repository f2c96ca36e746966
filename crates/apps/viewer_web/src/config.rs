//! Page configuration: two presets plus partial JSON overrides.
//!
//! Every section is `#[serde(default)]`, so a host page only sends the keys it wants to
//! change. Overrides are merged onto the chosen preset before deserializing.

use foundation::Rgba;
use layers::{
    AltitudePolicy, ArcStyle, ColorPolicyKind, DashGapPolicy, HighlightPolicy, Palette, PointStyle,
    RingStyle,
};
use scene::{
    AmbientLight, Atmosphere, CameraSettings, ControlSettings, DirectionalLight, Fog, GlobeMaterial,
    GlobeStyle, LightRig, PointLight, SceneSettings, TrafficStyle,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DAYLIGHT: &str = "daylight";
pub const NIGHT: &str = "night";

/// Upper bound on rings alive at once around one airport.
const MAX_LIVE_RINGS_PER_AIRPORT: f64 = 64.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown preset `{0}` (expected `daylight` or `night`)")]
    UnknownPreset(String),
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub antialias: bool,
    /// Upper bound on the device pixel ratio; 0 uses the ratio as reported.
    pub max_pixel_ratio: f64,
    pub canvas_id: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            max_pixel_ratio: 0.0,
            canvas_id: "globe-canvas".to_string(),
        }
    }
}

/// Camera drift towards the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxSettings {
    pub enabled: bool,
    pub damping: f64,
    /// Horizontal drift stops once the pointer is further than this fraction of the
    /// half-width from the center.
    pub dead_zone_fraction: f64,
}

impl Default for ParallaxSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            damping: 0.005,
            dead_zone_fraction: 0.5,
        }
    }
}

/// When the deferred traffic layers are attached.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrafficGate {
    /// A fixed delay measured from bootstrap.
    FixedDelay { delay_ms: f64 },
    /// On the globe's ready signal, or after `max_wait_ms` if it never arrives.
    GlobeReady { max_wait_ms: f64 },
}

impl Default for TrafficGate {
    fn default() -> Self {
        Self::FixedDelay { delay_ms: 1000.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrafficSettings {
    pub gate: TrafficGate,
    #[serde(flatten)]
    pub style: TrafficStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub renderer: RendererSettings,
    pub scene: SceneSettings,
    pub camera: CameraSettings,
    pub controls: ControlSettings,
    pub parallax: ParallaxSettings,
    pub globe: GlobeStyle,
    pub traffic: TrafficSettings,
    /// `tracing` filter directives, e.g. `"info,layers=debug"`.
    pub log_filter: String,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self::daylight()
    }
}

impl GlobeConfig {
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            DAYLIGHT | "" => Ok(Self::daylight()),
            NIGHT => Ok(Self::night()),
            _ => Err(ConfigError::UnknownPreset(name.to_string())),
        }
    }

    /// `json` is merged key by key onto the preset, then validated.
    pub fn from_json(preset: &str, json: &str) -> Result<Self, ConfigError> {
        let base = serde_json::to_value(Self::preset(preset)?)?;
        let overrides: Value = serde_json::from_str(json)?;
        let config: Self = serde_json::from_value(merge(base, overrides))?;
        config.validate()?;
        Ok(config)
    }

    /// White page, green hex cells, random traffic colors and a fixed one second delay.
    pub fn daylight() -> Self {
        let cream = Rgba::from_rgb_u32(0xFAF3DD);
        let green = Rgba::from_rgb_u32(0x46E96A);
        Self {
            renderer: RendererSettings::default(),
            scene: SceneSettings {
                background: Some(Rgba::WHITE),
                lights: LightRig {
                    ambient: AmbientLight {
                        color: Rgba::WHITE,
                        intensity: 0.6,
                    },
                    directional: vec![
                        DirectionalLight {
                            color: Rgba::WHITE,
                            intensity: 0.75,
                            position: [-800.0, 2000.0, 400.0],
                        },
                        DirectionalLight {
                            color: cream,
                            intensity: 1.0,
                            position: [-200.0, 500.0, 200.0],
                        },
                        DirectionalLight {
                            color: Rgba::WHITE,
                            intensity: 0.75,
                            position: [0.0, 2000.0, 0.0],
                        },
                    ],
                    point: vec![PointLight {
                        color: cream,
                        intensity: 0.75,
                        position: [-200.0, 100.0, 100.0],
                    }],
                },
                fog: Some(Fog {
                    color: Rgba::WHITE,
                    near: 400.0,
                    far: 2000.0,
                }),
            },
            camera: CameraSettings::default(),
            controls: ControlSettings::default(),
            parallax: ParallaxSettings::default(),
            globe: GlobeStyle {
                hex_polygons: layers::HexPolygonStyle {
                    colors: HighlightPolicy::new(
                        ["LOS", "ABV", "THA", "RUS", "UZB", "IDN", "KAZ", "MYS"],
                        green,
                        green,
                    ),
                    ..Default::default()
                },
                material: GlobeMaterial::default(),
                atmosphere: Atmosphere::default(),
                ..GlobeStyle::default()
            },
            traffic: TrafficSettings {
                gate: TrafficGate::FixedDelay { delay_ms: 1000.0 },
                style: TrafficStyle {
                    colors: ColorPolicyKind::Random { seed: None },
                    arcs: ArcStyle::default(),
                    points: PointStyle {
                        altitude: 9.0,
                        radius_deg: 0.0,
                        merge: true,
                    },
                    rings: RingStyle::default(),
                },
            },
            log_filter: "info".to_string(),
        }
    }

    /// Dark page, distinct highlight, airport-indexed gradients and rings, attached on ready.
    pub fn night() -> Self {
        let violet = Rgba::from_rgb_u32(0x3A228A);
        Self {
            renderer: RendererSettings::default(),
            scene: SceneSettings {
                background: Some(Rgba::from_rgb_u32(0x040D21)),
                lights: LightRig {
                    ambient: AmbientLight {
                        color: Rgba::from_rgb_u32(0xBBBBBB),
                        intensity: 0.3,
                    },
                    directional: vec![
                        DirectionalLight {
                            color: Rgba::WHITE,
                            intensity: 0.8,
                            position: [-800.0, 2000.0, 400.0],
                        },
                        DirectionalLight {
                            color: Rgba::from_rgb_u32(0x7982F6),
                            intensity: 1.0,
                            position: [-200.0, 500.0, 200.0],
                        },
                    ],
                    point: vec![PointLight {
                        color: Rgba::from_rgb_u32(0x8566CC),
                        intensity: 0.5,
                        position: [-200.0, 500.0, 200.0],
                    }],
                },
                fog: Some(Fog {
                    color: Rgba::from_rgb_u32(0x535EF3),
                    near: 400.0,
                    far: 2000.0,
                }),
            },
            camera: CameraSettings::default(),
            controls: ControlSettings {
                auto_rotate: true,
                auto_rotate_speed: 0.5,
                ..ControlSettings::default()
            },
            parallax: ParallaxSettings::default(),
            globe: GlobeStyle {
                hex_polygons: layers::HexPolygonStyle {
                    resolution: 3,
                    margin: 0.7,
                    colors: HighlightPolicy::new(
                        ["NGA", "GHA", "THA", "RUS", "UZB", "IDN", "KAZ", "MYS"],
                        Rgba::from_rgb_u32(0xF6C445),
                        Rgba::from_rgb_u32(0x6E58C4),
                    ),
                    ..Default::default()
                },
                material: GlobeMaterial {
                    color: violet,
                    emissive: Rgba::from_rgb_u32(0x220038),
                    emissive_intensity: 0.1,
                    shininess: 0.7,
                    transparent: false,
                    opacity: 1.0,
                },
                atmosphere: Atmosphere {
                    enabled: true,
                    color: violet,
                    altitude: 0.25,
                },
                ..GlobeStyle::default()
            },
            traffic: TrafficSettings {
                gate: TrafficGate::GlobeReady { max_wait_ms: 3000.0 },
                style: TrafficStyle {
                    colors: ColorPolicyKind::Indexed {
                        palette: Palette::night(),
                    },
                    arcs: ArcStyle {
                        altitude: AltitudePolicy::RandomBand { min: 0.1, max: 0.5 },
                        dash_gap: DashGapPolicy::OrderPlusCount,
                        ..ArcStyle::default()
                    },
                    points: PointStyle {
                        altitude: 0.0,
                        radius_deg: 0.25,
                        merge: true,
                    },
                    rings: RingStyle {
                        enabled: true,
                        ..RingStyle::default()
                    },
                },
            },
            log_filter: "info".to_string(),
        }
    }

    /// Rejects values the renderer cannot work with. A highlight that resolves to the base
    /// color is only warned about.
    pub fn validate(&self) -> Result<(), ConfigError> {
        use std::f64::consts::PI;

        let ratio = self.renderer.max_pixel_ratio;
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(invalid("renderer.max_pixel_ratio", "must be >= 0"));
        }

        let camera = &self.camera;
        if !(camera.fov_deg > 0.0 && camera.fov_deg < 180.0) {
            return Err(invalid("camera.fov_deg", "must be in (0, 180)"));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(invalid("camera.far", "must satisfy 0 < near < far"));
        }

        let controls = &self.controls;
        if controls.enable_damping && !(controls.damping_factor > 0.0 && controls.damping_factor <= 1.0) {
            return Err(invalid("controls.damping_factor", "must be in (0, 1]"));
        }
        if !(controls.min_distance >= 0.0 && controls.min_distance <= controls.max_distance) {
            return Err(invalid("controls.max_distance", "must be >= min_distance"));
        }
        if !(0.0..=PI).contains(&controls.min_polar_angle)
            || !(0.0..=PI).contains(&controls.max_polar_angle)
            || controls.min_polar_angle > controls.max_polar_angle
        {
            return Err(invalid(
                "controls.max_polar_angle",
                "polar bounds must satisfy 0 <= min <= max <= pi",
            ));
        }

        if !(0.0..=1.0).contains(&self.parallax.damping) {
            return Err(invalid("parallax.damping", "must be in [0, 1]"));
        }
        if !(self.parallax.dead_zone_fraction >= 0.0) {
            return Err(invalid("parallax.dead_zone_fraction", "must be >= 0"));
        }

        if let Some(fog) = &self.scene.fog {
            if !(fog.near >= 0.0 && fog.near < fog.far) {
                return Err(invalid("scene.fog", "must satisfy 0 <= near < far"));
            }
        }

        let globe = &self.globe;
        if !(globe.entrance_duration_ms >= 0.0) {
            return Err(invalid("globe.entrance_duration_ms", "must be >= 0"));
        }
        if globe.hex_polygons.resolution > 15 {
            return Err(invalid("globe.hex_polygons.resolution", "must be in 0..=15"));
        }
        if !(0.0..1.0).contains(&globe.hex_polygons.margin) {
            return Err(invalid("globe.hex_polygons.margin", "must be in [0, 1)"));
        }
        if !globe.hex_polygons.colors.is_effective() {
            tracing::warn!(
                allow_list = ?globe.hex_polygons.colors.allow_list,
                "hex highlight color equals the base color; highlighted countries look like the rest"
            );
        }

        match self.traffic.gate {
            TrafficGate::FixedDelay { delay_ms } if !(delay_ms >= 0.0) => {
                return Err(invalid("traffic.gate.delay_ms", "must be >= 0"));
            }
            TrafficGate::GlobeReady { max_wait_ms } if !(max_wait_ms > 0.0) => {
                return Err(invalid("traffic.gate.max_wait_ms", "must be > 0"));
            }
            _ => {}
        }

        let arcs = &self.traffic.style.arcs;
        if !(arcs.dash_animate_time_ms > 0.0) {
            return Err(invalid("traffic.arcs.dash_animate_time_ms", "must be > 0"));
        }
        if !(arcs.transition_ms >= 0.0) {
            return Err(invalid("traffic.arcs.transition_ms", "must be >= 0"));
        }
        if arcs.curve_resolution < 2 {
            return Err(invalid("traffic.arcs.curve_resolution", "must be >= 2"));
        }
        if let AltitudePolicy::RandomBand { min, max } = arcs.altitude {
            if !(min >= 0.0 && min <= max) {
                return Err(invalid("traffic.arcs.altitude", "band must satisfy 0 <= min <= max"));
            }
        }

        let rings = &self.traffic.style.rings;
        if rings.enabled {
            if !(rings.repeat_period_ms > 0.0) {
                return Err(invalid("traffic.rings.repeat_period_ms", "must be > 0"));
            }
            if !(rings.propagation_speed > 0.0 && rings.max_radius_deg > 0.0) {
                return Err(invalid(
                    "traffic.rings.propagation_speed",
                    "speed and max radius must be > 0",
                ));
            }
            if rings.lifetime_ms() / rings.repeat_period_ms > MAX_LIVE_RINGS_PER_AIRPORT {
                return Err(invalid(
                    "traffic.rings.repeat_period_ms",
                    "too many live rings per airport; raise the period or the speed",
                ));
            }
        }
        Ok(())
    }
}

/// Objects merge recursively; anything else in `overrides` replaces the base value.
/// A tagged object whose `kind` changes is replaced whole so stale variant fields do not
/// leak into the new variant.
fn merge(base: Value, overrides: Value) -> Value {
    match (base, overrides) {
        (Value::Object(mut base), Value::Object(overrides)) => {
            let kind_changed = matches!(
                (base.get("kind"), overrides.get("kind")),
                (Some(old), Some(new)) if old != new
            );
            if kind_changed {
                return Value::Object(overrides);
            }
            for (key, value) in overrides {
                let merged = match base.remove(&key) {
                    Some(existing) => merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overrides) => overrides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn daylight_keeps_the_page_values() {
        let config = GlobeConfig::preset("daylight").expect("preset");
        assert_eq!(config.scene.background, Some(Rgba::WHITE));
        assert_eq!(config.scene.lights.directional.len(), 3);
        assert_eq!(config.scene.lights.point.len(), 1);
        assert_eq!(config.traffic.gate, TrafficGate::FixedDelay { delay_ms: 1000.0 });
        assert_eq!(config.traffic.style.points.altitude, 9.0);
        assert_eq!(config.traffic.style.points.radius_deg, 0.0);
        assert!(!config.traffic.style.rings.enabled);
        assert!(!config.globe.hex_polygons.colors.is_effective());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn night_highlight_is_visible() {
        let config = GlobeConfig::preset("Night").expect("preset");
        let colors = &config.globe.hex_polygons.colors;
        assert!(colors.is_effective());
        assert_ne!(colors.color_for("NGA"), colors.color_for("BRA"));
        assert!(matches!(config.traffic.gate, TrafficGate::GlobeReady { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn presets_keep_the_full_device_pixel_ratio() {
        for name in [DAYLIGHT, NIGHT] {
            let config = GlobeConfig::preset(name).expect("preset");
            assert_eq!(config.renderer.max_pixel_ratio, 0.0, "{name}");
        }
    }

    #[test]
    fn ring_flood_is_rejected() {
        let json = r#"{ "traffic": { "rings": { "repeat_period_ms": 1, "propagation_speed": 0.01 } } }"#;
        let err = GlobeConfig::from_json("night", json).expect_err("ring flood");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "traffic.rings.repeat_period_ms",
                ..
            }
        ));

        let json = r#"{ "traffic": { "rings": { "repeat_period_ms": 100 } } }"#;
        assert!(GlobeConfig::from_json("night", json).is_ok());
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            GlobeConfig::preset("sunset"),
            Err(ConfigError::UnknownPreset(name)) if name == "sunset"
        ));
    }

    #[test]
    fn partial_json_overrides_the_preset() {
        let json = r#"{
            "parallax": { "dead_zone_fraction": 0.25 },
            "traffic": { "gate": { "kind": "globe_ready", "max_wait_ms": 2500 } },
            "scene": { "background": null }
        }"#;
        let config = GlobeConfig::from_json("daylight", json).expect("config");
        assert_eq!(config.parallax.dead_zone_fraction, 0.25);
        assert_eq!(config.parallax.damping, 0.005);
        assert_eq!(config.traffic.gate, TrafficGate::GlobeReady { max_wait_ms: 2500.0 });
        assert_eq!(config.scene.background, None);
        assert_eq!(config.scene.lights.directional.len(), 3);
        assert_eq!(config.traffic.style.points.altitude, 9.0);
    }

    #[test]
    fn changing_a_tagged_variant_drops_old_fields() {
        let json = r##"{ "traffic": { "colors": { "kind": "uniform", "color": "#ff0000" } } }"##;
        let config = GlobeConfig::from_json("night", json).expect("config");
        assert_eq!(
            config.traffic.style.colors,
            ColorPolicyKind::Uniform {
                color: Rgba::from_rgb_u32(0xFF0000)
            }
        );
    }

    #[test]
    fn invalid_values_are_reported_by_field() {
        let fog = r##"{ "scene": { "fog": { "color": "#fff", "near": 900, "far": 100 } } }"##;
        let err = GlobeConfig::from_json("daylight", fog).expect_err("inverted fog");
        assert!(matches!(err, ConfigError::Invalid { field: "scene.fog", .. }));

        let err = GlobeConfig::from_json("daylight", r#"{ "controls": { "min_distance": 600 } }"#)
            .expect_err("inverted distance");
        assert!(matches!(err, ConfigError::Invalid { field: "controls.max_distance", .. }));

        let err = GlobeConfig::from_json("daylight", r##"{ "scene": { "background": "#zzz" } }"##)
            .expect_err("bad color");
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
