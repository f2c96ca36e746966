use formats::CountryFeature;
use foundation::TimeMs;
use layers::{HexPolygonError, HexPolygonLayer, HexPolygonStyle, Layer};
use runtime::{EventBus, Frame};
use serde::{Deserialize, Serialize};

use crate::material::{Atmosphere, GlobeMaterial};
use crate::prefabs::traffic::{TrafficFrame, TrafficLayers};

pub const HEX_POLYGON_LAYER: u64 = 1;

/// Lifecycle of the globe object.
///
/// `Uninitialized → BaseGeometryBuilt → TrafficLayerAttached`, with `clear_traffic` going back
/// one step and `dispose` reachable from anywhere. `Disposed` is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GlobeState {
    Uninitialized,
    BaseGeometryBuilt,
    TrafficLayerAttached,
    Disposed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobeEvent {
    /// The entrance animation finished (or was skipped).
    Ready,
}

#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error("cannot {action} while the globe is {state:?}")]
    InvalidTransition {
        state: GlobeState,
        action: &'static str,
    },
    #[error(transparent)]
    HexPolygons(#[from] HexPolygonError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeStyle {
    pub hex_polygons: HexPolygonStyle,
    pub material: GlobeMaterial,
    pub atmosphere: Atmosphere,
    pub animate_in: bool,
    pub entrance_duration_ms: f64,
}

impl Default for GlobeStyle {
    fn default() -> Self {
        Self {
            hex_polygons: HexPolygonStyle::default(),
            material: GlobeMaterial::default(),
            atmosphere: Atmosphere::default(),
            animate_in: true,
            entrance_duration_ms: 600.0,
        }
    }
}

/// Quadratic ease-out.
fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

#[derive(Debug)]
pub struct Globe {
    state: GlobeState,
    style: GlobeStyle,
    hex_polygons: Option<HexPolygonLayer>,
    traffic: Option<TrafficLayers>,
    entrance_started: Option<TimeMs>,
    scale: f64,
    ready: bool,
    /// Bumped whenever geometry changes so renderers know to re-upload.
    revision: u64,
}

impl Globe {
    pub fn new(style: GlobeStyle) -> Self {
        Self {
            state: GlobeState::Uninitialized,
            style,
            hex_polygons: None,
            traffic: None,
            entrance_started: None,
            scale: 0.0,
            ready: false,
            revision: 0,
        }
    }

    pub fn state(&self) -> GlobeState {
        self.state
    }

    pub fn style(&self) -> &GlobeStyle {
        &self.style
    }

    /// Current entrance-animation scale in `[0, 1]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn hex_polygons(&self) -> Option<&HexPolygonLayer> {
        self.hex_polygons.as_ref()
    }

    pub fn traffic(&self) -> Option<&TrafficLayers> {
        self.traffic.as_ref()
    }

    pub fn has_traffic(&self) -> bool {
        self.traffic.is_some()
    }

    fn expect_state(&self, expected: GlobeState, action: &'static str) -> Result<(), GlobeError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(GlobeError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    pub fn build_base(&mut self, countries: &[CountryFeature]) -> Result<(), GlobeError> {
        self.expect_state(GlobeState::Uninitialized, "build base geometry")?;
        let layer = HexPolygonLayer::build(HEX_POLYGON_LAYER, countries, &self.style.hex_polygons)?;
        tracing::debug!(layer = layer.name(), id = layer.id().0, "layer built");
        tracing::info!(cells = layer.cells.len(), "globe base geometry built");
        self.hex_polygons = Some(layer);
        self.state = GlobeState::BaseGeometryBuilt;
        self.revision += 1;
        Ok(())
    }

    pub fn attach_traffic(&mut self, traffic: TrafficLayers) -> Result<(), GlobeError> {
        self.expect_state(GlobeState::BaseGeometryBuilt, "attach traffic")?;
        let built: [&dyn Layer; 3] = [&traffic.arcs, &traffic.points, &traffic.rings];
        for layer in built {
            tracing::debug!(layer = layer.name(), id = layer.id().0, "layer built");
        }
        tracing::info!(
            arcs = traffic.arcs.arcs.len(),
            points = traffic.points.len(),
            rings = traffic.rings.emitters.len(),
            "traffic layer attached"
        );
        self.traffic = Some(traffic);
        self.state = GlobeState::TrafficLayerAttached;
        self.revision += 1;
        Ok(())
    }

    pub fn clear_traffic(&mut self) -> Result<(), GlobeError> {
        self.expect_state(GlobeState::TrafficLayerAttached, "clear traffic")?;
        self.traffic = None;
        self.state = GlobeState::BaseGeometryBuilt;
        self.revision += 1;
        tracing::info!("traffic layer cleared");
        Ok(())
    }

    /// Drops all geometry. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == GlobeState::Disposed {
            return;
        }
        self.hex_polygons = None;
        self.traffic = None;
        self.state = GlobeState::Disposed;
        self.revision += 1;
        tracing::info!("globe disposed");
    }

    /// Advances the entrance animation; emits [`GlobeEvent::Ready`] exactly once.
    pub fn tick(&mut self, frame: Frame, events: &mut EventBus<GlobeEvent>) {
        if matches!(self.state, GlobeState::Uninitialized | GlobeState::Disposed) || self.ready {
            return;
        }
        let duration = self.style.entrance_duration_ms;
        if self.style.animate_in && duration > 0.0 {
            let started = *self.entrance_started.get_or_insert(frame.time);
            let t = frame.time.since(started) / duration;
            self.scale = ease_out_quad(t);
            if t < 1.0 {
                return;
            }
        }
        self.scale = 1.0;
        self.ready = true;
        events.emit(frame, GlobeEvent::Ready);
    }

    pub fn traffic_frame(&self, now: TimeMs) -> Option<TrafficFrame> {
        self.traffic.as_ref().map(|t| t.frame(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefabs::traffic::TrafficStyle;
    use crate::prefabs::traffic::tests::datasets;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn frame(index: u64, ms: f64) -> Frame {
        Frame::new(index, TimeMs(ms), 16.0)
    }

    fn built_globe() -> Globe {
        let mut globe = Globe::new(GlobeStyle::default());
        globe.build_base(&datasets().countries).expect("base geometry");
        globe
    }

    fn traffic(at: f64) -> TrafficLayers {
        let mut rng = StdRng::seed_from_u64(5);
        TrafficLayers::build(&datasets(), &TrafficStyle::default(), TimeMs(at), &mut rng)
    }

    #[test]
    fn lifecycle_transitions() {
        let mut globe = Globe::new(GlobeStyle::default());
        assert_eq!(globe.state(), GlobeState::Uninitialized);
        assert!(globe.attach_traffic(traffic(0.0)).is_err());

        globe.build_base(&datasets().countries).expect("base geometry");
        assert_eq!(globe.state(), GlobeState::BaseGeometryBuilt);
        assert!(globe.hex_polygons().is_some_and(|h| !h.cells.is_empty()));
        assert!(globe.clear_traffic().is_err());

        globe.attach_traffic(traffic(0.0)).expect("attach");
        assert_eq!(globe.state(), GlobeState::TrafficLayerAttached);
        assert!(matches!(
            globe.attach_traffic(traffic(0.0)),
            Err(GlobeError::InvalidTransition { .. })
        ));

        globe.clear_traffic().expect("clear");
        assert_eq!(globe.state(), GlobeState::BaseGeometryBuilt);
        assert!(!globe.has_traffic());

        let before = globe.revision();
        globe.dispose();
        globe.dispose();
        assert_eq!(globe.state(), GlobeState::Disposed);
        assert_eq!(globe.revision(), before + 1);
        assert!(globe.build_base(&[]).is_err());
    }

    #[test]
    fn entrance_animation_signals_ready_once() {
        let mut globe = built_globe();
        let mut events = EventBus::new();
        globe.tick(frame(0, 1000.0), &mut events);
        assert_eq!(globe.scale(), 0.0);
        globe.tick(frame(1, 1300.0), &mut events);
        assert_eq!(globe.scale(), 0.75);
        assert!(events.is_empty());

        globe.tick(frame(2, 1600.0), &mut events);
        globe.tick(frame(3, 1700.0), &mut events);
        assert!(globe.is_ready());
        assert_eq!(globe.scale(), 1.0);
        let drained = events.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].payload, GlobeEvent::Ready);
        assert_eq!(drained[0].frame_index, 2);
    }

    #[test]
    fn without_animate_in_ready_fires_on_first_tick() {
        let style = GlobeStyle {
            animate_in: false,
            ..GlobeStyle::default()
        };
        let mut globe = Globe::new(style);
        let mut events = EventBus::new();
        globe.tick(frame(0, 0.0), &mut events);
        assert!(events.is_empty(), "no signal before base geometry exists");

        globe.build_base(&datasets().countries).expect("base geometry");
        globe.tick(frame(1, 16.0), &mut events);
        assert_eq!(events.drain().len(), 1);
        assert_eq!(globe.scale(), 1.0);
    }

    #[test]
    fn disposed_globe_ignores_ticks() {
        let mut globe = built_globe();
        globe.dispose();
        let mut events = EventBus::new();
        globe.tick(frame(0, 0.0), &mut events);
        globe.tick(frame(1, 5000.0), &mut events);
        assert!(events.is_empty());
        assert!(globe.traffic_frame(TimeMs(5000.0)).is_none());
    }
}
