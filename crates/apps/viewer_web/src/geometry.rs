//! CPU-side vertex data and uniforms for the wgpu backend.

use bytemuck::{Pod, Zeroable};
use foundation::math::Vec3;
use gpu::{RenderCommand, RenderFrame};
use layers::{ArcsLayer, HexPolygonLayer, PointsLayer, RingInstance, RingStyle, ring_outline, units_per_degree};
use scene::{MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Hex cells and point columns.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LitVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ArcVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    /// Relative distance along the arc, dash length, dash gap, initial gap.
    pub dash: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Per-frame uniform block. Every member is a `vec4` or an array of them so the layout
/// matches WGSL uniform rules without padding fields.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position, globe scale.
    pub camera: [f32; 4],
    /// Ambient color premultiplied by intensity.
    pub ambient: [f32; 4],
    /// Fog color, 1 when fog is on.
    pub fog_color: [f32; 4],
    /// Fog near, fog far.
    pub fog_range: [f32; 4],
    /// Material color, opacity.
    pub material_color: [f32; 4],
    /// Emissive color times intensity, shininess.
    pub material_emissive: [f32; 4],
    /// Atmosphere color, altitude.
    pub atmosphere: [f32; 4],
    /// Dash translation, reveal.
    pub arcs: [f32; 4],
    /// Directional light count, point light count.
    pub counts: [f32; 4],
    pub dir_color: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub dir_position: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub point_color: [[f32; 4]; MAX_POINT_LIGHTS],
    pub point_position: [[f32; 4]; MAX_POINT_LIGHTS],
}

fn rgb_times(rgb: [f32; 3], s: f32, w: f32) -> [f32; 4] {
    [rgb[0] * s, rgb[1] * s, rgb[2] * s, w]
}

fn position4(p: [f64; 3]) -> [f32; 4] {
    [p[0] as f32, p[1] as f32, p[2] as f32, 1.0]
}

impl Globals {
    pub fn from_frame(frame: &RenderFrame<'_>) -> Self {
        let mut g = Self::zeroed();
        g.view_proj = frame.camera.view_proj;
        let [x, y, z] = frame.camera.position;
        g.camera = [x, y, z, frame.globe_scale];

        let lights = frame.lights;
        g.ambient = rgb_times(lights.ambient.color.rgb(), lights.ambient.intensity, 1.0);
        for (i, light) in lights.directional.iter().take(MAX_DIRECTIONAL_LIGHTS).enumerate() {
            g.dir_color[i] = rgb_times(light.color.rgb(), light.intensity, 1.0);
            g.dir_position[i] = position4(light.position);
        }
        for (i, light) in lights.point.iter().take(MAX_POINT_LIGHTS).enumerate() {
            g.point_color[i] = rgb_times(light.color.rgb(), light.intensity, 1.0);
            g.point_position[i] = position4(light.position);
        }
        g.counts = [
            lights.directional.len().min(MAX_DIRECTIONAL_LIGHTS) as f32,
            lights.point.len().min(MAX_POINT_LIGHTS) as f32,
            0.0,
            0.0,
        ];

        if let Some(fog) = frame.fog {
            g.fog_color = rgb_times(fog.color.rgb(), 1.0, 1.0);
            g.fog_range = [fog.near as f32, fog.far as f32, 0.0, 0.0];
        }

        for command in &frame.commands {
            match command {
                RenderCommand::Globe { material } => {
                    g.material_color = rgb_times(material.color.rgb(), 1.0, material.effective_opacity());
                    g.material_emissive =
                        rgb_times(material.emissive.rgb(), material.emissive_intensity, material.shininess);
                }
                RenderCommand::Atmosphere { atmosphere } => {
                    g.atmosphere = rgb_times(atmosphere.color.rgb(), 1.0, atmosphere.altitude as f32);
                }
                RenderCommand::Arcs { frame, .. } => {
                    g.arcs = [frame.dash_translate as f32, frame.reveal as f32, 0.0, 0.0];
                }
                _ => {}
            }
        }
        g
    }
}

/// Unit UV sphere. Seen from outside, triangles wind clockwise.
pub fn sphere_mesh(lat_segments: u32, lon_segments: u32) -> (Vec<SphereVertex>, Vec<u16>) {
    let lat_segments = lat_segments.max(3);
    let lon_segments = lon_segments.max(3);

    let mut vertices = Vec::with_capacity(((lat_segments + 1) * (lon_segments + 1)) as usize);
    for lat in 0..=lat_segments {
        let theta = lat as f32 / lat_segments as f32 * std::f32::consts::PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for lon in 0..=lon_segments {
            let phi = lon as f32 / lon_segments as f32 * std::f32::consts::TAU;
            let (sin_p, cos_p) = phi.sin_cos();
            let p = [sin_t * cos_p, cos_t, sin_t * sin_p];
            vertices.push(SphereVertex {
                position: p,
                normal: p,
            });
        }
    }

    let stride = lon_segments + 1;
    let mut indices = Vec::with_capacity((lat_segments * lon_segments * 6) as usize);
    for lat in 0..lat_segments {
        for lon in 0..lon_segments {
            let i0 = lat * stride + lon;
            let i1 = i0 + 1;
            let i2 = i0 + stride;
            let i3 = i2 + 1;
            indices.extend([i0, i2, i1, i1, i2, i3].map(|i| i as u16));
        }
    }
    (vertices, indices)
}

/// One triangle fan per cell around its center.
pub fn hex_vertices(layer: &HexPolygonLayer) -> Vec<LitVertex> {
    let mut out = Vec::new();
    for cell in &layer.cells {
        let normal = cell.center.normalize().as_f32();
        let color = cell.color.to_array();
        let vertex = |p: Vec3| LitVertex {
            position: p.as_f32(),
            normal,
            color,
        };
        let n = cell.boundary.len();
        for i in 0..n {
            out.push(vertex(cell.center));
            out.push(vertex(cell.boundary[i]));
            out.push(vertex(cell.boundary[(i + 1) % n]));
        }
    }
    out
}

/// Flat ribbons `stroke` degrees wide lying tangent to the globe.
pub fn arc_vertices(layer: &ArcsLayer) -> Vec<ArcVertex> {
    let mut out = Vec::new();
    let unit = units_per_degree();
    for arc in &layer.arcs {
        let points = &arc.path.positions;
        let rel = &arc.path.rel_distance;
        let n = points.len().min(rel.len());
        if n < 2 {
            continue;
        }
        let half_width = arc.stroke * unit / 2.0;
        let edges: Vec<(Vec3, Vec3)> = (0..n)
            .map(|i| {
                let tangent = (points[(i + 1).min(n - 1)] - points[i.saturating_sub(1)]).normalize();
                let side = tangent.cross(points[i].normalize()).normalize().scale(half_width);
                (points[i] + side, points[i] - side)
            })
            .collect();
        let dash = |r: f32| {
            [
                r,
                arc.dash.length as f32,
                arc.dash.gap as f32,
                arc.dash.initial_gap as f32,
            ]
        };
        let vertex = |p: Vec3, r: f32| ArcVertex {
            position: p.as_f32(),
            color: arc.color.at(r).to_array(),
            dash: dash(r),
        };
        for i in 0..n - 1 {
            let (l0, r0) = edges[i];
            let (l1, r1) = edges[i + 1];
            let (t0, t1) = (rel[i], rel[i + 1]);
            out.extend([
                vertex(l0, t0),
                vertex(r0, t0),
                vertex(l1, t1),
                vertex(r0, t0),
                vertex(r1, t1),
                vertex(l1, t1),
            ]);
        }
    }
    out
}

/// Capped prisms from each point's base to its top. Zero-radius points are skipped.
pub fn point_vertices(layer: &PointsLayer, sides: usize) -> Vec<LitVertex> {
    let sides = sides.max(3);
    let mut out = Vec::new();
    for point in layer.points().filter(|p| p.is_drawable()) {
        let axis = {
            let a = (point.top - point.base).normalize();
            if a == Vec3::ZERO { point.base.normalize() } else { a }
        };
        let helper = if axis.y.abs() < 0.9 { Vec3::Y } else { Vec3::new(1.0, 0.0, 0.0) };
        let u = axis.cross(helper).normalize();
        let v = axis.cross(u);
        let color = point.color.to_array();
        let ring = |k: usize| {
            let a = std::f64::consts::TAU * k as f64 / sides as f64;
            u.scale(a.cos()) + v.scale(a.sin())
        };
        let vertex = |p: Vec3, n: Vec3| LitVertex {
            position: p.as_f32(),
            normal: n.as_f32(),
            color,
        };
        for k in 0..sides {
            let (o0, o1) = (ring(k), ring(k + 1));
            let (b0, b1) = (point.base + o0.scale(point.radius), point.base + o1.scale(point.radius));
            let (t0, t1) = (point.top + o0.scale(point.radius), point.top + o1.scale(point.radius));
            out.extend([
                vertex(b0, o0),
                vertex(b1, o1),
                vertex(t1, o1),
                vertex(b0, o0),
                vertex(t1, o1),
                vertex(t0, o0),
                vertex(point.top, axis),
                vertex(t0, axis),
                vertex(t1, axis),
            ]);
        }
    }
    out
}

/// Line-list segments of every live ring outline.
pub fn ring_vertices(rings: &[RingInstance], style: &RingStyle) -> Vec<LineVertex> {
    let mut out = Vec::new();
    for ring in rings {
        let color = ring.color.to_array();
        let outline = ring_outline(ring.center, ring.radius_deg, style.altitude, style.resolution);
        for pair in outline.windows(2) {
            out.push(LineVertex {
                position: pair[0].as_f32(),
                color,
            });
            out.push(LineVertex {
                position: pair[1].as_f32(),
                color,
            });
        }
    }
    out
}

/// Smallest vertex buffer that fits `needed` bytes: keeps `current` when it suffices,
/// otherwise the next power of two, never below 4 KiB.
pub fn buffer_capacity(current: u64, needed: u64) -> u64 {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two().max(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::bundled_datasets;
    use foundation::TimeMs;
    use gpu::Renderer;
    use layers::ColorPolicyKind;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use runtime::Frame;
    use scene::{CameraSettings, Globe, GlobeStyle, PerspectiveCamera, Scene, SceneSettings, TrafficLayers, TrafficStyle};

    fn traffic(style: &TrafficStyle) -> TrafficLayers {
        let data = bundled_datasets().expect("bundled datasets");
        let mut rng = StdRng::seed_from_u64(3);
        TrafficLayers::build(&data, style, TimeMs(0.0), &mut rng)
    }

    #[test]
    fn uniform_block_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn sphere_mesh_is_a_closed_unit_sphere() {
        let (vertices, indices) = sphere_mesh(8, 16);
        assert_eq!(vertices.len(), 9 * 17);
        assert_eq!(indices.len(), 8 * 16 * 6);
        for v in &vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn hex_fans_cover_every_boundary_edge() {
        let data = bundled_datasets().expect("bundled datasets");
        let layer = HexPolygonLayer::build(1, &data.countries, &Default::default()).expect("hex layer");
        let edges: usize = layer.cells.iter().map(|c| c.boundary.len()).sum();
        assert_eq!(hex_vertices(&layer).len(), edges * 3);
    }

    #[test]
    fn arc_ribbons_carry_dash_attributes() {
        let traffic = traffic(&TrafficStyle::default());
        let vertices = arc_vertices(&traffic.arcs);
        let expected: usize = traffic.arcs.arcs.iter().map(|a| 6 * (a.path.positions.len() - 1)).sum();
        assert_eq!(vertices.len(), expected);

        let first = &traffic.arcs.arcs[0];
        assert_eq!(vertices[0].dash[1], first.dash.length as f32);
        assert_eq!(vertices[0].dash[3], first.dash.initial_gap as f32);
        assert_eq!(vertices[0].dash[0], 0.0);
    }

    #[test]
    fn ribbon_width_follows_stroke() {
        let traffic = traffic(&TrafficStyle::default());
        let vertices = arc_vertices(&traffic.arcs);
        let arc = &traffic.arcs.arcs[0];
        let [ax, ay, az] = vertices[0].position;
        let [bx, by, bz] = vertices[1].position;
        let width = ((ax - bx).powi(2) + (ay - by).powi(2) + (az - bz).powi(2)).sqrt() as f64;
        assert!((width - arc.stroke * units_per_degree()).abs() < 1e-3, "width {width}");
    }

    #[test]
    fn zero_radius_points_are_not_drawn() {
        let mut style = TrafficStyle::default();
        style.points.radius_deg = 0.0;
        assert!(point_vertices(&traffic(&style).points, 8).is_empty());

        style.points.radius_deg = 0.25;
        let traffic = traffic(&style);
        assert_eq!(point_vertices(&traffic.points, 8).len(), traffic.points.len() * 8 * 9);
    }

    #[test]
    fn ring_outlines_become_line_pairs() {
        let mut style = TrafficStyle {
            colors: ColorPolicyKind::Uniform {
                color: foundation::Rgba::WHITE,
            },
            ..TrafficStyle::default()
        };
        style.rings.enabled = true;
        style.rings.resolution = 16;
        let traffic = traffic(&style);
        let rings = traffic.rings.extract(500.0);
        assert!(!rings.is_empty());
        assert_eq!(ring_vertices(&rings, &traffic.rings.style).len(), rings.len() * 16 * 2);
    }

    #[test]
    fn globals_pack_lights_and_scale() {
        let mut settings = SceneSettings::default();
        settings.lights.directional.push(scene::DirectionalLight {
            color: foundation::Rgba::WHITE,
            intensity: 0.5,
            position: [0.0, 10.0, 0.0],
        });
        let mut globe = Globe::new(GlobeStyle::default());
        globe.build_base(&[]).expect("base");
        let scene = Scene::new(&settings, globe);
        let camera = PerspectiveCamera::new(&CameraSettings::default(), 1.5);
        let frame = Renderer::collect(&scene, &camera, Frame::new(0, TimeMs(0.0), 0.0));

        let globals = Globals::from_frame(&frame);
        assert_eq!(globals.counts[0], 1.0);
        assert_eq!(globals.counts[1], 0.0);
        assert_eq!(globals.dir_color[0], [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(globals.camera, [0.0, 0.0, 400.0, 0.0]);
        assert_eq!(globals.ambient, [0.6, 0.6, 0.6, 1.0]);
        assert_eq!(globals.material_color[3], 0.1);
    }

    #[test]
    fn ring_buffer_grows_only_when_full() {
        let frame_bytes = |rings: u64| rings * 32 * std::mem::size_of::<LineVertex>() as u64;
        let mut capacity = 0;
        let mut reallocations = 0;
        for rings in [3, 5, 2, 18, 18, 4, 0, 17] {
            let next = buffer_capacity(capacity, frame_bytes(rings));
            if next != capacity {
                reallocations += 1;
            }
            assert!(next >= frame_bytes(rings));
            capacity = next;
        }
        assert_eq!(capacity, 16384);
        assert_eq!(reallocations, 3);
    }
}
