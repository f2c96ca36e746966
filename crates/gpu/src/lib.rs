pub mod error;
pub mod renderer;
pub mod surface;
pub mod viewport;

pub use error::*;
pub use renderer::*;
pub use surface::*;
pub use viewport::*;
