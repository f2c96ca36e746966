//! Damped orbit controls around a fixed target.
//!
//! Pointer drag accumulates a spherical delta; every `update` applies a fraction of it to the
//! camera and decays the rest, so rotation eases out after release. Distance and polar angle
//! are clamped on every update, which also pulls a camera placed elsewhere onto the orbit.

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;

/// Keeps `phi` away from the poles where the basis degenerates.
const PHI_EPS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSettings {
    pub enable_damping: bool,
    pub damping_factor: f64,
    pub rotate_speed: f64,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub zoom_speed: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_polar_angle: f64,
    pub max_polar_angle: f64,
    pub auto_rotate: bool,
    /// Degrees per frame at 60 fps times 30; 2.0 is one orbit every 30 s.
    pub auto_rotate_speed: f64,
}

impl Default for ControlSettings {
    fn default() -> Self {
        use std::f64::consts::PI;
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 0.8,
            enable_rotate: true,
            enable_zoom: false,
            enable_pan: false,
            zoom_speed: 1.0,
            min_distance: 500.0,
            max_distance: 500.0,
            min_polar_angle: PI / 3.5,
            max_polar_angle: PI - PI / 3.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
        }
    }
}

/// Radius, polar angle from +Y, azimuth around +Y measured from +Z.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Spherical {
    pub radius: f64,
    pub phi: f64,
    pub theta: f64,
}

impl Spherical {
    pub fn from_vec(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
            theta: v.x.atan2(v.z),
        }
    }

    pub fn to_vec(self) -> Vec3 {
        let s = self.phi.sin() * self.radius;
        Vec3::new(s * self.theta.sin(), self.phi.cos() * self.radius, s * self.theta.cos())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragButton {
    #[default]
    None,
    Rotate,
    Pan,
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: ControlSettings,
    pub target: Vec3,

    /// Pending rotation not yet applied to the camera.
    delta: Spherical,
    /// Pending dolly factor; 1.0 means none.
    scale: f64,

    /// Viewport height in CSS pixels, the reference for drag-to-angle conversion.
    viewport_height: f64,
    drag: DragButton,
    last_pos_px: [f64; 2],
}

impl OrbitControls {
    pub fn new(settings: ControlSettings) -> Self {
        Self {
            settings,
            target: Vec3::ZERO,
            delta: Spherical::default(),
            scale: 1.0,
            viewport_height: 1.0,
            drag: DragButton::None,
            last_pos_px: [0.0, 0.0],
        }
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(1.0);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != DragButton::None
    }

    /// `button`: 0 = primary (rotate), 2 = secondary (pan).
    pub fn on_pointer_down(&mut self, pos_px: [f64; 2], button: i16) {
        self.drag = match button {
            0 if self.settings.enable_rotate => DragButton::Rotate,
            2 if self.settings.enable_pan => DragButton::Pan,
            _ => DragButton::None,
        };
        self.last_pos_px = pos_px;
    }

    pub fn on_pointer_move(&mut self, pos_px: [f64; 2]) {
        if self.drag != DragButton::Rotate {
            // Pan is accepted as a button but has no effect on a locked-target globe.
            self.last_pos_px = pos_px;
            return;
        }
        let dx = (pos_px[0] - self.last_pos_px[0]) * self.settings.rotate_speed;
        let dy = (pos_px[1] - self.last_pos_px[1]) * self.settings.rotate_speed;
        self.last_pos_px = pos_px;
        let tau = std::f64::consts::TAU;
        self.rotate_left(tau * dx / self.viewport_height);
        self.rotate_up(tau * dy / self.viewport_height);
    }

    pub fn on_pointer_up(&mut self) {
        self.drag = DragButton::None;
    }

    /// Positive `delta_y` zooms out. Ignored when zoom is disabled.
    pub fn on_wheel(&mut self, delta_y: f64) {
        if !self.settings.enable_zoom || delta_y == 0.0 {
            return;
        }
        let step = 0.95f64.powf(self.settings.zoom_speed);
        if delta_y > 0.0 {
            self.scale /= step;
        } else {
            self.scale *= step;
        }
    }

    pub fn rotate_left(&mut self, angle: f64) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f64) {
        self.delta.phi -= angle;
    }

    /// Applies pending input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let s = &self.settings.clone();
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_vec(offset);

        if s.auto_rotate && self.drag == DragButton::None {
            self.rotate_left(std::f64::consts::TAU / 60.0 / 60.0 * s.auto_rotate_speed);
        }

        let applied = if s.enable_damping { s.damping_factor } else { 1.0 };
        spherical.theta += self.delta.theta * applied;
        spherical.phi += self.delta.phi * applied;

        spherical.phi = spherical
            .phi
            .clamp(s.min_polar_angle.min(s.max_polar_angle), s.max_polar_angle.max(s.min_polar_angle))
            .clamp(PHI_EPS, std::f64::consts::PI - PHI_EPS);
        spherical.radius = (spherical.radius * self.scale)
            .clamp(s.min_distance.min(s.max_distance), s.max_distance.max(s.min_distance));

        let before = camera.position;
        camera.position = self.target + spherical.to_vec();
        camera.look_at(self.target);

        if s.enable_damping {
            self.delta.theta *= 1.0 - s.damping_factor;
            self.delta.phi *= 1.0 - s.damping_factor;
        } else {
            self.delta = Spherical::default();
        }
        self.scale = 1.0;

        (camera.position - before).length() > 1e-9
    }
}
