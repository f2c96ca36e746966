//! Per-tick camera drift towards the pointer.

use gpu::Viewport;
use scene::PerspectiveCamera;

use crate::config::ParallaxSettings;

/// Pointer position relative to the viewport center, in CSS pixels. +y is down.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerOffset {
    pub fn from_client(client_x: f64, client_y: f64, viewport: &Viewport) -> Self {
        let (half_w, half_h) = viewport.half_extents();
        Self {
            x: client_x - half_w,
            y: client_y - half_h,
        }
    }
}

/// Eases `camera_x` towards half the pointer offset, unless the pointer sits further than
/// `dead_zone_fraction` of the half-width from the center.
pub fn parallax_x(camera_x: f64, pointer_x: f64, half_width: f64, settings: &ParallaxSettings) -> f64 {
    if pointer_x.abs() <= half_width * settings.dead_zone_fraction {
        camera_x + (pointer_x / 2.0 - camera_x) * settings.damping
    } else {
        camera_x
    }
}

/// Eases `camera_y` towards minus half the pointer offset. No dead zone.
pub fn parallax_y(camera_y: f64, pointer_y: f64, settings: &ParallaxSettings) -> f64 {
    camera_y + (-pointer_y / 2.0 - camera_y) * settings.damping
}

pub fn apply_parallax(
    camera: &mut PerspectiveCamera,
    pointer: PointerOffset,
    viewport: &Viewport,
    settings: &ParallaxSettings,
) {
    if !settings.enabled {
        return;
    }
    let (half_width, _) = viewport.half_extents();
    camera.position.x = parallax_x(camera.position.x, pointer.x, half_width, settings);
    camera.position.y = parallax_y(camera.position.y, pointer.y, settings);
}

/// Counters kept across ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub rendered: u64,
    pub skipped: u64,
}
