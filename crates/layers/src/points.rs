use formats::AirportRecord;
use foundation::Rgba;
use foundation::math::{GLOBE_RADIUS, Vec3, polar_to_cartesian};
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};
use crate::policy::ColorPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Column height as a fraction of the globe radius.
    pub altitude: f64,
    /// Column radius in degrees of arc, multiplied by the airport's display size.
    pub radius_deg: f64,
    /// Draw every airport in one batch.
    pub merge: bool,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            altitude: 0.1,
            radius_deg: 0.25,
            merge: true,
        }
    }
}

/// Scene units per degree of arc on the globe surface.
pub fn units_per_degree() -> f64 {
    2.0 * std::f64::consts::PI * GLOBE_RADIUS / 360.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointInstance {
    pub label: String,
    pub base: Vec3,
    pub top: Vec3,
    /// Column radius in scene units; 0 keeps the marker in the data but draws nothing.
    pub radius: f64,
    pub color: Rgba,
}

impl PointInstance {
    pub fn is_drawable(&self) -> bool {
        self.radius > 0.0
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointBatch {
    pub points: Vec<PointInstance>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointsLayer {
    id: LayerId,
    pub batches: Vec<PointBatch>,
}

impl PointsLayer {
    pub fn build(id: u64, airports: &[AirportRecord], style: &PointStyle, colors: &mut dyn ColorPolicy) -> Self {
        let instances = airports.iter().map(|airport| PointInstance {
            label: airport.label.clone(),
            base: polar_to_cartesian(airport.location, 0.0),
            top: polar_to_cartesian(airport.location, style.altitude),
            radius: style.radius_deg * airport.size * units_per_degree(),
            color: colors.point_color(airport),
        });
        let batches = if style.merge {
            vec![PointBatch {
                points: instances.collect(),
            }]
        } else {
            instances.map(|p| PointBatch { points: vec![p] }).collect()
        };
        Self {
            id: LayerId(id),
            batches,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &PointInstance> {
        self.batches.iter().flat_map(|b| b.points.iter())
    }

    pub fn len(&self) -> usize {
        self.batches.iter().map(|b| b.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Layer for PointsLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn name(&self) -> &'static str {
        "points"
    }
}
