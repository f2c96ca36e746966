pub mod camera;
pub mod controls;
pub mod lights;
pub mod material;
pub mod prefabs;
pub mod world;

pub use camera::*;
pub use controls::*;
pub use lights::*;
pub use material::*;
pub use prefabs::*;
pub use world::*;
