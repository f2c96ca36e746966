use foundation::math::{Mat4, Vec3, mat4_look_at_rh, mat4_mul, mat4_perspective_rh_z0};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_deg: 50.0,
            near: 0.1,
            far: 2000.0,
            position: [0.0, 0.0, 400.0],
        }
    }
}

/// Perspective camera that always looks at `target` with +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(settings: &CameraSettings, aspect: f64) -> Self {
        let [x, y, z] = settings.position;
        Self {
            fov_deg: settings.fov_deg,
            aspect,
            near: settings.near,
            far: settings.far,
            position: Vec3::new(x, y, z),
            target: Vec3::ZERO,
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn set_aspect(&mut self, aspect: f64) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn distance_to_target(&self) -> f64 {
        (self.position - self.target).length()
    }

    pub fn view_matrix(&self) -> Mat4 {
        let up = if (self.position - self.target).normalize().cross(Vec3::Y).length() < 1e-9 {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::Y
        };
        mat4_look_at_rh(self.position, self.target, up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4_perspective_rh_z0(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        mat4_mul(self.projection_matrix(), self.view_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraSettings, PerspectiveCamera};
    use foundation::math::{Vec3, mat4_transform_point};

    #[test]
    fn defaults_match_a_distant_globe_view() {
        let camera = PerspectiveCamera::new(&CameraSettings::default(), 1.5);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 400.0));
        assert_eq!(camera.distance_to_target(), 400.0);
        assert_eq!(camera.fov_deg, 50.0);
    }

    #[test]
    fn rejects_degenerate_aspect() {
        let mut camera = PerspectiveCamera::new(&CameraSettings::default(), 1.5);
        camera.set_aspect(0.0);
        camera.set_aspect(f64::NAN);
        assert_eq!(camera.aspect, 1.5);
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn target_projects_to_center_from_the_pole() {
        let mut camera = PerspectiveCamera::new(&CameraSettings::default(), 1.0);
        camera.position = Vec3::new(0.0, 500.0, 0.0);
        let clip = mat4_transform_point(camera.view_proj(), Vec3::ZERO);
        assert!(clip[3] > 0.0);
        assert!((clip[0] / clip[3]).abs() < 1e-4);
        assert!((clip[1] / clip[3]).abs() < 1e-4);
    }
}
