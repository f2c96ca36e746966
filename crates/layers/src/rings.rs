use formats::AirportRecord;
use foundation::Rgba;
use foundation::math::{LatLon, Vec3, polar_to_cartesian};
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};
use crate::policy::ColorPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingStyle {
    pub enabled: bool,
    pub max_radius_deg: f64,
    /// Growth rate in degrees per second.
    pub propagation_speed: f64,
    pub repeat_period_ms: f64,
    pub altitude: f64,
    pub resolution: usize,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            max_radius_deg: 3.0,
            propagation_speed: 1.0,
            repeat_period_ms: 700.0,
            altitude: 0.0015,
            resolution: 64,
        }
    }
}

impl RingStyle {
    /// How long one ring lives before reaching `max_radius_deg`.
    pub fn lifetime_ms(&self) -> f64 {
        if self.propagation_speed <= 0.0 {
            return 0.0;
        }
        self.max_radius_deg / self.propagation_speed * 1000.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingEmitter {
    pub label: String,
    pub center: LatLon,
    pub color: Rgba,
}

/// One live ring; `color` already carries the fade for its progress.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RingInstance {
    pub emitter: usize,
    pub center: LatLon,
    pub radius_deg: f64,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingsLayer {
    id: LayerId,
    pub style: RingStyle,
    pub emitters: Vec<RingEmitter>,
}

impl RingsLayer {
    pub fn build(id: u64, airports: &[AirportRecord], style: RingStyle, colors: &mut dyn ColorPolicy) -> Self {
        let emitters = if style.enabled {
            airports
                .iter()
                .map(|airport| RingEmitter {
                    label: airport.label.clone(),
                    center: airport.location,
                    color: colors.point_color(airport),
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            id: LayerId(id),
            style,
            emitters,
        }
    }

    /// Rings alive `elapsed_ms` after the layer was attached.
    ///
    /// Every emitter starts a ring at `k * repeat_period_ms` for `k = 0, 1, ..`; a ring grows at
    /// `propagation_speed` and disappears once it reaches `max_radius_deg`.
    pub fn extract(&self, elapsed_ms: f64) -> Vec<RingInstance> {
        let style = &self.style;
        let lifetime = style.lifetime_ms();
        if self.emitters.is_empty() || lifetime <= 0.0 || style.repeat_period_ms <= 0.0 || elapsed_ms < 0.0 {
            return Vec::new();
        }
        let newest = (elapsed_ms / style.repeat_period_ms).floor() as u64;
        let oldest = ((elapsed_ms - lifetime) / style.repeat_period_ms).ceil().max(0.0) as u64;

        let mut out = Vec::new();
        for (emitter_index, emitter) in self.emitters.iter().enumerate() {
            for k in oldest..=newest {
                let age = elapsed_ms - k as f64 * style.repeat_period_ms;
                if !(0.0..lifetime).contains(&age) {
                    continue;
                }
                let radius_deg = style.propagation_speed * age / 1000.0;
                let t = (radius_deg / style.max_radius_deg) as f32;
                out.push(RingInstance {
                    emitter: emitter_index,
                    center: emitter.center,
                    radius_deg,
                    color: emitter.color.with_alpha(emitter.color.a * (1.0 - t)),
                });
            }
        }
        out
    }
}

impl Layer for RingsLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "rings"
    }
}

/// Point at angular distance `distance_deg` from `center` along `bearing_deg` (clockwise from north).
pub fn destination(center: LatLon, bearing_deg: f64, distance_deg: f64) -> LatLon {
    let (lat1, lon1) = (center.lat_deg.to_radians(), center.lon_deg.to_radians());
    let (theta, delta) = (bearing_deg.to_radians(), distance_deg.to_radians());
    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let lon2 = lon1
        + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());
    let lon = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    LatLon::new(lat2.to_degrees(), lon)
}

/// Closed outline of a ring, `segments + 1` points with the first repeated last.
pub fn ring_outline(center: LatLon, radius_deg: f64, altitude: f64, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|i| {
            let bearing = 360.0 * i as f64 / segments as f64;
            polar_to_cartesian(destination(center, bearing, radius_deg), altitude)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::UniformColor;
    use crate::policy::tests::airport;
    use foundation::math::angular_distance;

    fn layer() -> RingsLayer {
        let style = RingStyle {
            enabled: true,
            ..RingStyle::default()
        };
        let mut colors = UniformColor(Rgba::WHITE);
        RingsLayer::build(3, &[airport("LOS", 6.58, 3.32)], style, &mut colors)
    }

    #[test]
    fn rings_emit_on_the_repeat_period() {
        let layer = layer();
        let at_start = layer.extract(0.0);
        assert_eq!(at_start.len(), 1);
        assert_eq!(at_start[0].radius_deg, 0.0);

        let radii: Vec<f64> = layer.extract(1000.0).iter().map(|r| r.radius_deg).collect();
        assert_eq!(radii.len(), 2);
        assert!((radii[0] - 1.0).abs() < 1e-9);
        assert!((radii[1] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn rings_expire_at_max_radius_and_fade() {
        let layer = layer();
        let rings = layer.extract(5000.0);
        assert_eq!(rings.len(), 5);
        for ring in &rings {
            assert!(ring.radius_deg < layer.style.max_radius_deg);
            let expected = 1.0 - (ring.radius_deg / layer.style.max_radius_deg) as f32;
            assert!((ring.color.a - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn disabled_rings_have_no_emitters() {
        let mut colors = UniformColor(Rgba::WHITE);
        let layer = RingsLayer::build(3, &[airport("LOS", 6.58, 3.32)], RingStyle::default(), &mut colors);
        assert!(layer.emitters.is_empty());
        assert!(layer.extract(1000.0).is_empty());
    }

    #[test]
    fn outline_is_equidistant_from_center() {
        let center = LatLon::new(6.58, 3.32);
        let outline = ring_outline(center, 2.0, 0.0, 32);
        assert_eq!(outline.len(), 33);
        for bearing in [0.0, 90.0, 181.0, 300.0] {
            let p = destination(center, bearing, 2.0);
            assert!((angular_distance(center, p).to_degrees() - 2.0).abs() < 1e-6);
        }
    }
}
