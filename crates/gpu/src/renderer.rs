use foundation::math::Mat4;
use foundation::{Rgba, TimeMs};
use layers::{ArcsFrame, ArcsLayer, HexPolygonLayer, PointsLayer, RingInstance, RingStyle};
use runtime::Frame;
use scene::{Atmosphere, Fog, GlobeMaterial, GlobeState, LightRig, PerspectiveCamera, Scene};

/// Camera data shared by every draw of a frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraUniforms {
    pub view_proj: Mat4,
    pub position: [f32; 3],
}

impl CameraUniforms {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view_proj: camera.view_proj(),
            position: camera.position.as_f32(),
        }
    }
}

/// One draw, borrowing its data from the scene. `revision` tells backends when cached
/// vertex buffers are stale.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand<'a> {
    Globe {
        material: &'a GlobeMaterial,
    },
    HexPolygons {
        layer: &'a HexPolygonLayer,
        revision: u64,
    },
    Atmosphere {
        atmosphere: &'a Atmosphere,
    },
    Arcs {
        layer: &'a ArcsLayer,
        frame: ArcsFrame,
        revision: u64,
    },
    Points {
        layer: &'a PointsLayer,
        revision: u64,
    },
    Rings {
        rings: Vec<RingInstance>,
        style: &'a RingStyle,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame<'a> {
    pub index: u64,
    pub time: TimeMs,
    pub camera: CameraUniforms,
    pub clear_color: Rgba,
    pub lights: &'a LightRig,
    pub fog: Option<Fog>,
    /// Entrance-animation scale applied to the whole globe object.
    pub globe_scale: f32,
    pub commands: Vec<RenderCommand<'a>>,
}

impl RenderFrame<'_> {
    pub fn has_traffic(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, RenderCommand::Arcs { .. } | RenderCommand::Points { .. }))
    }
}

pub struct Renderer;

impl Renderer {
    /// Draw list for one frame, back to front: sphere, hex cells, atmosphere shell, traffic.
    pub fn collect<'a>(scene: &'a Scene, camera: &PerspectiveCamera, frame: Frame) -> RenderFrame<'a> {
        let globe = &scene.globe;
        let revision = globe.revision();
        let mut commands = Vec::new();

        let live = matches!(
            globe.state(),
            GlobeState::BaseGeometryBuilt | GlobeState::TrafficLayerAttached
        );
        if live {
            let style = globe.style();
            commands.push(RenderCommand::Globe {
                material: &style.material,
            });
            if let Some(layer) = globe.hex_polygons() {
                commands.push(RenderCommand::HexPolygons { layer, revision });
            }
            if style.atmosphere.enabled {
                commands.push(RenderCommand::Atmosphere {
                    atmosphere: &style.atmosphere,
                });
            }
            if let Some(traffic) = globe.traffic() {
                let animated = traffic.frame(frame.time);
                commands.push(RenderCommand::Arcs {
                    layer: &traffic.arcs,
                    frame: animated.arcs,
                    revision,
                });
                commands.push(RenderCommand::Points {
                    layer: &traffic.points,
                    revision,
                });
                if !animated.rings.is_empty() {
                    commands.push(RenderCommand::Rings {
                        rings: animated.rings,
                        style: &traffic.rings.style,
                    });
                }
            }
        }

        RenderFrame {
            index: frame.index,
            time: frame.time,
            camera: CameraUniforms::from_camera(camera),
            clear_color: scene.clear_color(),
            lights: &scene.lights,
            fog: scene.fog,
            globe_scale: globe.scale() as f32,
            commands,
        }
    }
}
