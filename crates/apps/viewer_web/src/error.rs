use formats::DatasetError;
use gpu::SurfaceError;
use scene::GlobeError;
use wasm_bindgen::JsValue;

use crate::config::ConfigError;

/// Anything that stops the viewer from starting.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("dataset: {0}")]
    Dataset(#[from] DatasetError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("render surface: {0}")]
    Surface(#[from] SurfaceError),
    #[error("globe: {0}")]
    Globe(#[from] GlobeError),
    #[error("browser: {0}")]
    Js(String),
    #[error("a globe is already running on this page")]
    AlreadyStarted,
}

impl ViewerError {
    pub fn js(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<ViewerError> for JsValue {
    fn from(err: ViewerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
