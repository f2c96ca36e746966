/// Acquiring the render surface or graphics context failed. Fatal: reported before the frame
/// loop starts.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("canvas setup failed: {0}")]
    Canvas(String),
    #[error("failed to create surface: {0}")]
    CreateSurface(String),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to acquire device: {0}")]
    Device(String),
    #[error("surface has no supported format for this adapter")]
    Unsupported,
    #[error("GPU rendering is only available on wasm32")]
    UnsupportedTarget,
}

/// A single frame could not be drawn. The frame is skipped and the loop carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost")]
    Lost,
    #[error("surface outdated")]
    Outdated,
    #[error("timed out acquiring the next frame")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("{0}")]
    Other(String),
}

impl RenderError {
    /// Whether the surface must be reconfigured before the next frame.
    pub fn needs_reconfigure(&self) -> bool {
        matches!(self, Self::Lost | Self::Outdated)
    }
}
