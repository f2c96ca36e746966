//! Per-datum policies for the traffic layers: color, arc altitude, dash gap and stroke.
//!
//! Policies are selected by configuration; the layers only ever see the resolved values.

use formats::{AirportIndex, AirportRecord, FlightRecord};
use foundation::Rgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::palette::{GradientPair, Palette};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ArcColor {
    Solid(Rgba),
    /// Interpolated from origin (`t = 0`) to destination (`t = 1`).
    Gradient(GradientPair),
}

impl ArcColor {
    pub fn at(&self, t: f32) -> Rgba {
        match self {
            Self::Solid(c) => *c,
            Self::Gradient(pair) => pair.at(t),
        }
    }
}

/// Derives display colors from records.
pub trait ColorPolicy {
    fn arc_color(&mut self, flight: &FlightRecord) -> ArcColor;
    fn point_color(&mut self, airport: &AirportRecord) -> Rgba;
}

/// A uniform draw over `0x000000..0xFFFFFF` for every call.
#[derive(Debug, Clone)]
pub struct RandomColors {
    rng: StdRng,
}

impl RandomColors {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    fn draw(&mut self) -> Rgba {
        Rgba::from_rgb_u32(self.rng.gen_range(0..0xFF_FFFF))
    }
}

impl ColorPolicy for RandomColors {
    fn arc_color(&mut self, _flight: &FlightRecord) -> ArcColor {
        ArcColor::Solid(self.draw())
    }

    fn point_color(&mut self, _airport: &AirportRecord) -> Rgba {
        self.draw()
    }
}

/// Deterministic lookup: airport index modulo the palette size.
#[derive(Debug, Clone)]
pub struct IndexedPalette {
    palette: Palette,
    index: AirportIndex,
}

impl IndexedPalette {
    pub fn new(palette: Palette, index: AirportIndex) -> Self {
        Self { palette, index }
    }
}

impl ColorPolicy for IndexedPalette {
    fn arc_color(&mut self, flight: &FlightRecord) -> ArcColor {
        ArcColor::Gradient(self.palette.pick(self.index.for_flight(flight)))
    }

    fn point_color(&mut self, airport: &AirportRecord) -> Rgba {
        self.palette.pick(self.index.get(&airport.label)).start
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformColor(pub Rgba);

impl ColorPolicy for UniformColor {
    fn arc_color(&mut self, _flight: &FlightRecord) -> ArcColor {
        ArcColor::Solid(self.0)
    }

    fn point_color(&mut self, _airport: &AirportRecord) -> Rgba {
        self.0
    }
}

/// Configuration-side selector for a [`ColorPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorPolicyKind {
    /// `seed: None` draws from OS entropy.
    Random { seed: Option<u64> },
    Indexed { palette: Palette },
    Uniform { color: Rgba },
}

impl Default for ColorPolicyKind {
    fn default() -> Self {
        Self::Random { seed: None }
    }
}

impl ColorPolicyKind {
    pub fn build(&self, index: &AirportIndex) -> Box<dyn ColorPolicy> {
        match self {
            Self::Random { seed: Some(seed) } => Box::new(RandomColors::seeded(*seed)),
            Self::Random { seed: None } => Box::new(RandomColors::new(StdRng::from_entropy())),
            Self::Indexed { palette } => Box::new(IndexedPalette::new(palette.clone(), index.clone())),
            Self::Uniform { color } => Box::new(UniformColor(*color)),
        }
    }
}

/// Arc height as a fraction of the globe radius.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AltitudePolicy {
    /// The record's own `arcAlt`.
    #[default]
    Field,
    /// Uniform draw in `[min, max)`.
    RandomBand { min: f64, max: f64 },
    /// Proportional to the great-circle distance.
    Auto,
}

impl AltitudePolicy {
    /// `None` means "derive from distance".
    pub fn resolve<R: Rng + ?Sized>(&self, flight: &FlightRecord, rng: &mut R) -> Option<f64> {
        match *self {
            Self::Field => Some(flight.arc_alt),
            Self::RandomBand { min, max } if min < max => Some(rng.gen_range(min..max)),
            Self::RandomBand { min, .. } => Some(min),
            Self::Auto => None,
        }
    }
}

/// Gap between dashes, in relative-distance units along the arc.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashGapPolicy {
    Fixed { gap: f64 },
    /// `order + number of flights`, so later flights pulse less often.
    OrderPlusCount,
}

impl Default for DashGapPolicy {
    fn default() -> Self {
        Self::Fixed { gap: 10.0 }
    }
}

impl DashGapPolicy {
    pub fn gap(&self, flight: &FlightRecord, flight_count: usize) -> f64 {
        match *self {
            Self::Fixed { gap } => gap,
            Self::OrderPlusCount => f64::from(flight.order) + flight_count as f64,
        }
    }
}

/// Stroke width selected by the flight's status flag.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeWidths {
    pub active: f64,
    pub inactive: f64,
}

impl Default for StrokeWidths {
    fn default() -> Self {
        Self {
            active: 0.5,
            inactive: 0.3,
        }
    }
}

impl StrokeWidths {
    pub fn width(&self, status: bool) -> f64 {
        if status { self.active } else { self.inactive }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use foundation::math::LatLon;
    use pretty_assertions::assert_eq;

    pub(crate) fn flight(from: &str, to: &str, order: u32, status: bool) -> FlightRecord {
        FlightRecord {
            origin: from.to_string(),
            destination: to.to_string(),
            start: LatLon::new(6.58, 3.32),
            end: LatLon::new(25.25, 55.37),
            arc_alt: 0.25,
            order,
            status,
            flight_code: None,
            date: None,
        }
    }

    pub(crate) fn airport(label: &str, lat: f64, lon: f64) -> AirportRecord {
        AirportRecord {
            label: label.to_string(),
            location: LatLon::new(lat, lon),
            size: 1.0,
            city: None,
            country: None,
        }
    }

    #[test]
    fn stroke_is_two_valued_by_status() {
        let widths = StrokeWidths::default();
        let flights = [
            flight("LOS", "DXB", 0, true),
            flight("DXB", "LHR", 1, false),
            flight("LHR", "JFK", 2, true),
        ];
        for f in &flights {
            let w = widths.width(f.status);
            assert!(w == widths.active || w == widths.inactive);
            assert_eq!(w == widths.active, f.status);
        }
    }

    #[test]
    fn order_plus_count_gap() {
        let flights: Vec<_> = (0..3).map(|i| flight("LOS", "ABV", i, false)).collect();
        let gaps: Vec<f64> = flights
            .iter()
            .map(|f| DashGapPolicy::OrderPlusCount.gap(f, flights.len()))
            .collect();
        assert_eq!(gaps, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn seeded_random_colors_are_reproducible() {
        let f = flight("LOS", "ABV", 0, false);
        let mut a = RandomColors::seeded(7);
        let mut b = RandomColors::seeded(7);
        for _ in 0..4 {
            assert_eq!(a.arc_color(&f), b.arc_color(&f));
        }
        for _ in 0..16 {
            let ArcColor::Solid(c) = a.arc_color(&f) else {
                panic!("random policy yields solid colors");
            };
            assert_eq!(c.a, 1.0);
        }
    }

    #[test]
    fn indexed_palette_is_deterministic_per_airport() {
        let airports = [airport("LOS", 6.58, 3.32), airport("ABV", 9.0, 7.26)];
        let index = AirportIndex::build(&airports).expect("unique labels");
        let palette = Palette::night();
        let mut policy = IndexedPalette::new(palette.clone(), index);

        let from_los = policy.arc_color(&flight("LOS", "ABV", 0, false));
        assert_eq!(from_los, policy.arc_color(&flight("LOS", "XXX", 3, true)));
        assert_eq!(from_los, ArcColor::Gradient(palette.pick(Some(1))));
        assert_ne!(from_los, policy.arc_color(&flight("ABV", "LOS", 0, false)));
        assert_eq!(policy.point_color(&airports[1]), palette.pick(Some(2)).start);
    }

    #[test]
    fn altitude_policies() {
        let f = flight("LOS", "ABV", 0, false);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(AltitudePolicy::Field.resolve(&f, &mut rng), Some(0.25));
        assert_eq!(AltitudePolicy::Auto.resolve(&f, &mut rng), None);
        let band = AltitudePolicy::RandomBand { min: 0.1, max: 0.4 };
        for _ in 0..32 {
            let alt = band.resolve(&f, &mut rng).unwrap_or_default();
            assert!((0.1..0.4).contains(&alt));
        }
    }

    #[test]
    fn policy_kinds_deserialize_from_tagged_json() {
        let kind: ColorPolicyKind =
            serde_json::from_str(r##"{"kind":"uniform","color":"#ff0000"}"##).expect("parse");
        assert_eq!(kind, ColorPolicyKind::Uniform { color: Rgba::new(1.0, 0.0, 0.0, 1.0) });
        let gap: DashGapPolicy = serde_json::from_str(r#"{"kind":"order_plus_count"}"#).expect("parse");
        assert_eq!(gap, DashGapPolicy::OrderPlusCount);
    }
}
