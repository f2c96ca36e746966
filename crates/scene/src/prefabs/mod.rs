pub mod globe;
pub mod traffic;

pub use globe::*;
pub use traffic::*;
