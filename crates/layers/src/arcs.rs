use formats::FlightRecord;
use foundation::math::{GLOBE_RADIUS, LatLon, Vec3, angular_distance, interpolate, polar_to_cartesian};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};
use crate::policy::{AltitudePolicy, ArcColor, ColorPolicy, DashGapPolicy, StrokeWidths};

/// Arcs with zero altitude hug the surface at this height to avoid z-fighting.
const GROUND_ALTITUDE: f64 = 0.001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcStyle {
    pub altitude: AltitudePolicy,
    pub altitude_auto_scale: f64,
    pub stroke: StrokeWidths,
    /// Dash length as a fraction of the arc.
    pub dash_length: f64,
    pub dash_gap: DashGapPolicy,
    /// Initial gap is `order * initial_gap_scale`.
    pub initial_gap_scale: f64,
    /// Time for a dash to travel one full arc length; 0 freezes the pattern.
    pub dash_animate_time_ms: f64,
    pub transition_ms: f64,
    pub curve_resolution: usize,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            altitude: AltitudePolicy::Field,
            altitude_auto_scale: 0.5,
            stroke: StrokeWidths::default(),
            dash_length: 0.9,
            dash_gap: DashGapPolicy::default(),
            initial_gap_scale: 1.0,
            dash_animate_time_ms: 5400.0,
            transition_ms: 4000.0,
            curve_resolution: 64,
        }
    }
}

/// Resolved dash parameters of a single arc, in relative-distance units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DashPattern {
    pub length: f64,
    pub gap: f64,
    pub initial_gap: f64,
}

impl DashPattern {
    /// Whether the point at relative distance `r` is lit when the pattern is translated by `tau`.
    ///
    /// The pattern is laid out from the destination back, so a growing `tau` carries each
    /// dash from origin towards destination.
    pub fn is_visible(&self, r: f64, tau: f64) -> bool {
        let d = (1.0 - r) + tau;
        if d < self.initial_gap {
            return false;
        }
        let period = self.length + self.gap;
        if period <= 0.0 {
            return true;
        }
        (d - self.initial_gap).rem_euclid(period) <= self.length
    }
}

/// Dash translation after `elapsed_ms`: one unit of relative distance per `animate_time_ms`.
pub fn dash_translation(elapsed_ms: f64, animate_time_ms: f64) -> f64 {
    if animate_time_ms > 0.0 {
        elapsed_ms.max(0.0) / animate_time_ms
    } else {
        0.0
    }
}

/// Quadratic in-out progress of the grow-in transition.
pub fn transition_progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    let t = (elapsed_ms / duration_ms).clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Default height of an arc with no explicit altitude.
pub fn auto_altitude(start: LatLon, end: LatLon, auto_scale: f64) -> f64 {
    angular_distance(start, end) / 2.0 * auto_scale
}

/// Sampled arc: `positions[i]` sits at relative distance `rel_distance[i] = i / segments`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    pub positions: Vec<Vec3>,
    pub rel_distance: Vec<f32>,
}

/// Cubic Bézier from `start` to `end` with both control points lifted to `1.5 * altitude`,
/// placed at a quarter and three quarters of the great circle.
pub fn arc_path(start: LatLon, end: LatLon, altitude: f64, segments: usize) -> ArcPath {
    let segments = segments.max(2);
    let ts = (0..=segments).map(|i| i as f64 / segments as f64);
    let positions: Vec<Vec3> = if altitude > 0.0 {
        let p0 = polar_to_cartesian(start, 0.0);
        let p1 = polar_to_cartesian(interpolate(start, end, 0.25), altitude * 1.5);
        let p2 = polar_to_cartesian(interpolate(start, end, 0.75), altitude * 1.5);
        let p3 = polar_to_cartesian(end, 0.0);
        // Long, low arcs would dip below the surface between the control points.
        ts.map(|t| lift_to_surface(cubic_bezier(p0, p1, p2, p3, t))).collect()
    } else {
        ts.map(|t| polar_to_cartesian(interpolate(start, end, t), GROUND_ALTITUDE))
            .collect()
    };
    let rel_distance = (0..=segments)
        .map(|i| i as f32 / segments as f32)
        .collect();
    ArcPath {
        positions,
        rel_distance,
    }
}

fn lift_to_surface(p: Vec3) -> Vec3 {
    let len = p.length();
    if len > 0.0 && len < GLOBE_RADIUS {
        p.scale(GLOBE_RADIUS / len)
    } else {
        p
    }
}

fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f64) -> Vec3 {
    let u = 1.0 - t;
    p0.scale(u * u * u) + p1.scale(3.0 * u * u * t) + p2.scale(3.0 * u * t * t) + p3.scale(t * t * t)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcInstance {
    /// Position of the source record in the flight list.
    pub flight_index: usize,
    pub altitude: f64,
    pub path: ArcPath,
    pub color: ArcColor,
    pub stroke: f64,
    pub dash: DashPattern,
}

/// Per-frame animation state shared by all arcs of a layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcsFrame {
    pub dash_translate: f64,
    /// Fraction of every arc revealed so far, origin first.
    pub reveal: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcsLayer {
    id: LayerId,
    pub style: ArcStyle,
    pub arcs: Vec<ArcInstance>,
}

impl ArcsLayer {
    pub fn build<R: Rng + ?Sized>(
        id: u64,
        flights: &[FlightRecord],
        style: ArcStyle,
        colors: &mut dyn ColorPolicy,
        rng: &mut R,
    ) -> Self {
        let arcs = flights
            .iter()
            .enumerate()
            .map(|(flight_index, flight)| {
                let altitude = style
                    .altitude
                    .resolve(flight, rng)
                    .unwrap_or_else(|| auto_altitude(flight.start, flight.end, style.altitude_auto_scale));
                ArcInstance {
                    flight_index,
                    altitude,
                    path: arc_path(flight.start, flight.end, altitude, style.curve_resolution),
                    color: colors.arc_color(flight),
                    stroke: style.stroke.width(flight.status),
                    dash: DashPattern {
                        length: style.dash_length,
                        gap: style.dash_gap.gap(flight, flights.len()),
                        initial_gap: f64::from(flight.order) * style.initial_gap_scale,
                    },
                }
            })
            .collect::<Vec<_>>();
        tracing::debug!(arcs = arcs.len(), "arcs layer built");
        Self {
            id: LayerId(id),
            style,
            arcs,
        }
    }

    /// Animation state `elapsed_ms` after the layer was attached.
    pub fn extract(&self, elapsed_ms: f64) -> ArcsFrame {
        ArcsFrame {
            dash_translate: dash_translation(elapsed_ms, self.style.dash_animate_time_ms),
            reveal: transition_progress(elapsed_ms, self.style.transition_ms),
        }
    }
}

impl Layer for ArcsLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "arcs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::UniformColor;
    use crate::policy::tests::flight;
    use foundation::Rgba;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build(flights: &[FlightRecord], style: ArcStyle) -> ArcsLayer {
        let mut colors = UniformColor(Rgba::WHITE);
        let mut rng = StdRng::seed_from_u64(3);
        ArcsLayer::build(1, flights, style, &mut colors, &mut rng)
    }

    #[test]
    fn staggered_dash_offsets_and_gaps() {
        let flights: Vec<_> = (0..3).map(|i| flight("LOS", "DXB", i, i == 1)).collect();
        let style = ArcStyle {
            dash_gap: DashGapPolicy::OrderPlusCount,
            ..ArcStyle::default()
        };
        let layer = build(&flights, style);
        let initial: Vec<f64> = layer.arcs.iter().map(|a| a.dash.initial_gap).collect();
        let gaps: Vec<f64> = layer.arcs.iter().map(|a| a.dash.gap).collect();
        assert_eq!(initial, vec![0.0, 1.0, 2.0]);
        assert_eq!(gaps, vec![3.0, 4.0, 5.0]);
        let strokes: Vec<f64> = layer.arcs.iter().map(|a| a.stroke).collect();
        assert_eq!(strokes, vec![0.3, 0.5, 0.3]);
    }

    #[test]
    fn bezier_endpoints_on_surface_and_midpoint_raised() {
        let f = flight("LOS", "DXB", 0, false);
        let path = arc_path(f.start, f.end, 0.25, 64);
        assert_eq!(path.positions.len(), 65);
        let first = path.positions[0].length();
        let last = path.positions[64].length();
        assert!((first - GLOBE_RADIUS).abs() < 1e-9);
        assert!((last - GLOBE_RADIUS).abs() < 1e-9);
        assert!(path.positions[32].length() > GLOBE_RADIUS * 1.1);
        assert_eq!(path.rel_distance[0], 0.0);
        assert_eq!(path.rel_distance[64], 1.0);
    }

    #[test]
    fn antipodal_routes_stay_outside_the_globe() {
        let start = LatLon::new(0.0, 0.0);
        let end = LatLon::new(0.0, 180.0);
        for altitude in [0.0, 0.1, 0.5] {
            let path = arc_path(start, end, altitude, 64);
            for (i, p) in path.positions.iter().enumerate() {
                assert!(
                    p.length() >= GLOBE_RADIUS - 1e-9,
                    "altitude {altitude} sample {i} at {}",
                    p.length()
                );
            }
        }
    }

    #[test]
    fn zero_altitude_follows_the_ground() {
        let f = flight("LOS", "DXB", 0, false);
        let path = arc_path(f.start, f.end, 0.0, 16);
        for p in &path.positions {
            assert!((p.length() - GLOBE_RADIUS * (1.0 + GROUND_ALTITUDE)).abs() < 1e-6);
        }
    }

    #[test]
    fn auto_altitude_scales_with_distance() {
        let f = flight("LOS", "DXB", 0, false);
        let near = auto_altitude(f.start, LatLon::new(7.0, 4.0), 0.5);
        let far = auto_altitude(f.start, f.end, 0.5);
        assert!(near < far);
        let style = ArcStyle {
            altitude: AltitudePolicy::Auto,
            ..ArcStyle::default()
        };
        let layer = build(&[f.clone()], style);
        assert!((layer.arcs[0].altitude - far).abs() < 1e-12);
    }

    #[test]
    fn dash_rule() {
        let dash = DashPattern {
            length: 0.9,
            gap: 10.0,
            initial_gap: 1.0,
        };
        assert!(!dash.is_visible(0.5, 0.0));
        assert!(dash.is_visible(0.5, 0.6));
        assert!(!dash.is_visible(0.5, 2.5));
        assert!(dash.is_visible(0.5, 0.6 + 10.9));
    }

    fn lit_centroid(dash: &DashPattern, tau: f64) -> f64 {
        let lit: Vec<f64> = (0..=200)
            .map(|i| f64::from(i) / 200.0)
            .filter(|&r| dash.is_visible(r, tau))
            .collect();
        assert!(!lit.is_empty(), "nothing lit at tau {tau}");
        lit.iter().sum::<f64>() / lit.len() as f64
    }

    #[test]
    fn dashes_travel_towards_the_destination() {
        let dash = DashPattern {
            length: 0.1,
            gap: 0.9,
            initial_gap: 0.0,
        };
        let early = lit_centroid(&dash, 0.2);
        let later = lit_centroid(&dash, 0.5);
        assert!((early - 0.15).abs() < 0.01, "early {early}");
        assert!((later - 0.45).abs() < 0.01, "later {later}");
    }

    #[test]
    fn staggered_dash_enters_at_the_origin() {
        let dash = DashPattern {
            length: 0.9,
            gap: 10.0,
            initial_gap: 2.0,
        };
        assert!(!dash.is_visible(0.0, 0.5));
        assert!(dash.is_visible(0.05, 1.1));
        assert!(!dash.is_visible(0.95, 1.1));
    }

    #[test]
    fn dash_translation_advances_one_unit_per_cycle() {
        assert_eq!(dash_translation(5400.0, 5400.0), 1.0);
        assert_eq!(dash_translation(2700.0, 5400.0), 0.5);
        assert_eq!(dash_translation(2700.0, 0.0), 0.0);
    }

    #[test]
    fn transition_reveals_over_duration() {
        assert_eq!(transition_progress(0.0, 4000.0), 0.0);
        assert_eq!(transition_progress(2000.0, 4000.0), 0.5);
        assert_eq!(transition_progress(4000.0, 4000.0), 1.0);
        assert_eq!(transition_progress(9000.0, 4000.0), 1.0);
        assert_eq!(transition_progress(10.0, 0.0), 1.0);
        let layer = build(&[flight("LOS", "DXB", 0, false)], ArcStyle::default());
        assert!(layer.extract(1000.0).reveal < layer.extract(3000.0).reveal);
    }
}
