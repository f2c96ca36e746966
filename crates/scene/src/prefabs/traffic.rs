use formats::Datasets;
use foundation::TimeMs;
use layers::{
    ArcStyle, ArcsFrame, ArcsLayer, ColorPolicyKind, PointStyle, PointsLayer, RingInstance, RingStyle,
    RingsLayer,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const ARCS_LAYER: u64 = 2;
pub const POINTS_LAYER: u64 = 3;
pub const RINGS_LAYER: u64 = 4;

/// Everything needed to turn flights and airports into the deferred traffic layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrafficStyle {
    pub colors: ColorPolicyKind,
    pub arcs: ArcStyle,
    pub points: PointStyle,
    pub rings: RingStyle,
}

/// Arcs, points and rings, attached together and removed together.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficLayers {
    pub arcs: ArcsLayer,
    pub points: PointsLayer,
    pub rings: RingsLayer,
    pub attached_at: TimeMs,
}

/// Time-dependent part of the traffic layers for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficFrame {
    pub arcs: ArcsFrame,
    pub rings: Vec<RingInstance>,
}

impl TrafficLayers {
    /// Colors are resolved once here; they do not change on later frames.
    pub fn build<R: Rng + ?Sized>(datasets: &Datasets, style: &TrafficStyle, attached_at: TimeMs, rng: &mut R) -> Self {
        let mut colors = style.colors.build(&datasets.airport_index);
        let arcs = ArcsLayer::build(ARCS_LAYER, &datasets.flights, style.arcs.clone(), &mut *colors, rng);
        let points = PointsLayer::build(POINTS_LAYER, &datasets.airports, &style.points, &mut *colors);
        let rings = RingsLayer::build(RINGS_LAYER, &datasets.airports, style.rings.clone(), &mut *colors);
        Self {
            arcs,
            points,
            rings,
            attached_at,
        }
    }

    pub fn frame(&self, now: TimeMs) -> TrafficFrame {
        let elapsed = now.since(self.attached_at);
        TrafficFrame {
            arcs: self.arcs.extract(elapsed),
            rings: self.rings.extract(elapsed),
        }
    }
}
