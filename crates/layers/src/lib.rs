//! Data layers drawn on the globe.
//!
//! Each layer turns read-only records into globe-space geometry once, then exposes a cheap
//! per-frame view (dash translation, reveal progress, live rings) driven by elapsed time.

pub mod arcs;
pub mod hex_polygons;
pub mod layer;
pub mod palette;
pub mod points;
pub mod policy;
pub mod rings;
pub mod symbology;

pub use arcs::*;
pub use hex_polygons::*;
pub use layer::*;
pub use palette::*;
pub use points::*;
pub use policy::*;
pub use rings::*;
pub use symbology::*;
