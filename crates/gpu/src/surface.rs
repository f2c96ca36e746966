use std::collections::VecDeque;

use foundation::math::Mat4;

use crate::error::RenderError;
use crate::renderer::{RenderCommand, RenderFrame};
use crate::viewport::Viewport;

/// Where frames end up: a GPU canvas in the browser or a recorder in tests.
pub trait RenderSurface {
    fn resize(&mut self, viewport: Viewport);

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError>;
}

/// What a [`HeadlessSurface`] remembers about each rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub index: u64,
    pub view_proj: Mat4,
    pub camera_position: [f32; 3],
    pub globe_scale: f32,
    pub arcs: usize,
    pub points: usize,
    pub rings: usize,
    pub hex_cells: usize,
}

/// Records frames instead of drawing them. Failures can be queued to exercise error paths.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    pub viewport: Option<Viewport>,
    pub resizes: usize,
    pub frames: Vec<FrameRecord>,
    failures: VecDeque<RenderError>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `render` call fails with `err`.
    pub fn fail_next(&mut self, err: RenderError) {
        self.failures.push_back(err);
    }

    pub fn physical_size(&self) -> Option<(u32, u32)> {
        self.viewport.map(|vp| vp.physical_size())
    }

    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.frames.last()
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.resizes += 1;
    }

    fn render(&mut self, frame: &RenderFrame<'_>) -> Result<(), RenderError> {
        if let Some(err) = self.failures.pop_front() {
            return Err(err);
        }
        let mut record = FrameRecord {
            index: frame.index,
            view_proj: frame.camera.view_proj,
            camera_position: frame.camera.position,
            globe_scale: frame.globe_scale,
            arcs: 0,
            points: 0,
            rings: 0,
            hex_cells: 0,
        };
        for command in &frame.commands {
            match command {
                RenderCommand::HexPolygons { layer, .. } => record.hex_cells = layer.cells.len(),
                RenderCommand::Arcs { layer, .. } => record.arcs = layer.arcs.len(),
                RenderCommand::Points { layer, .. } => record.points = layer.len(),
                RenderCommand::Rings { rings, .. } => record.rings = rings.len(),
                RenderCommand::Globe { .. } | RenderCommand::Atmosphere { .. } => {}
            }
        }
        self.frames.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HeadlessSurface, RenderSurface};
    use crate::error::RenderError;
    use crate::renderer::Renderer;
    use crate::viewport::Viewport;
    use foundation::TimeMs;
    use runtime::Frame;
    use scene::{CameraSettings, Globe, GlobeStyle, PerspectiveCamera, Scene, SceneSettings};

    #[test]
    fn records_frames_and_injected_failures() {
        let scene = Scene::new(&SceneSettings::default(), Globe::new(GlobeStyle::default()));
        let camera = PerspectiveCamera::new(&CameraSettings::default(), 1.0);
        let mut surface = HeadlessSurface::new();
        surface.resize(Viewport::new(800.0, 600.0, 2.0));
        assert_eq!(surface.physical_size(), Some((1600, 1200)));

        surface.fail_next(RenderError::Lost);
        let frame = Renderer::collect(&scene, &camera, Frame::new(0, TimeMs(0.0), 0.0));
        assert_eq!(surface.render(&frame), Err(RenderError::Lost));
        assert!(surface.frames.is_empty());

        let frame = Renderer::collect(&scene, &camera, Frame::new(1, TimeMs(16.0), 16.0));
        assert_eq!(surface.render(&frame), Ok(()));
        assert_eq!(surface.last_frame().map(|f| f.index), Some(1));
    }
}
