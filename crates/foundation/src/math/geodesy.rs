use serde::{Deserialize, Serialize};

use super::Vec3;

/// Radius of the rendered globe in scene units.
///
/// Camera distances, fog bounds and light positions are all expressed relative to this.
pub const GLOBE_RADIUS: f64 = 100.0;

/// Geographic coordinates in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl LatLon {
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    pub fn is_valid(self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
    }

    /// Unit vector in globe space (+Y is the north pole, lon 0 faces +Z).
    pub fn to_unit(self) -> Vec3 {
        polar_to_cartesian(self, 0.0).scale(1.0 / GLOBE_RADIUS)
    }
}

/// Globe-space position of a coordinate raised by `rel_altitude` (fraction of the radius).
pub fn polar_to_cartesian(p: LatLon, rel_altitude: f64) -> Vec3 {
    let phi = (90.0 - p.lat_deg).to_radians();
    let theta = (90.0 - p.lon_deg).to_radians();
    let r = GLOBE_RADIUS * (1.0 + rel_altitude);
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`polar_to_cartesian`]; returns the coordinate and relative altitude.
pub fn cartesian_to_polar(v: Vec3) -> (LatLon, f64) {
    let r = v.length();
    if r <= 1e-12 {
        return (LatLon::new(0.0, 0.0), -1.0);
    }
    let phi = (v.y / r).clamp(-1.0, 1.0).acos();
    let theta = v.z.atan2(v.x);
    let lat = 90.0 - phi.to_degrees();
    let mut lon = 90.0 - theta.to_degrees();
    if lon > 180.0 {
        lon -= 360.0;
    }
    (LatLon::new(lat, lon), r / GLOBE_RADIUS - 1.0)
}

/// Great-circle angular distance in radians.
pub fn angular_distance(a: LatLon, b: LatLon) -> f64 {
    a.to_unit().dot(b.to_unit()).clamp(-1.0, 1.0).acos()
}

/// Point at fraction `t` along the great circle from `a` to `b`.
pub fn interpolate(a: LatLon, b: LatLon, t: f64) -> LatLon {
    let u = slerp_unit(a.to_unit(), b.to_unit(), t);
    cartesian_to_polar(u.scale(GLOBE_RADIUS)).0
}

fn slerp_unit(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    let dot = a.dot(b).clamp(-1.0, 1.0);
    let omega = dot.acos();
    let sin_omega = omega.sin();
    if sin_omega.abs() >= 1e-6 {
        let a_scale = ((1.0 - t) * omega).sin() / sin_omega;
        let b_scale = (t * omega).sin() / sin_omega;
        a.scale(a_scale) + b.scale(b_scale)
    } else if dot > 0.0 {
        a.lerp(b, t).normalize()
    } else {
        // Antipodes: any great circle through `a` reaches `b`. Take the one towards the
        // pole axis, or towards +x when `a` sits on a pole.
        let helper = if a.y.abs() < 0.9 { Vec3::Y } else { Vec3::new(1.0, 0.0, 0.0) };
        let side = (helper + a.scale(-a.dot(helper))).normalize();
        let angle = t * std::f64::consts::PI;
        a.scale(angle.cos()) + side.scale(angle.sin())
    }
}
