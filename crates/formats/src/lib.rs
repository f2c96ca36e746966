//! Static datasets: country boundaries, flight records, airport records.
//!
//! Everything here is read-only after load. Loading validates every record and rejects
//! the whole dataset on the first malformed one.

pub mod airport_index;
pub mod airports;
pub mod countries;
pub mod datasets;
pub mod error;
pub mod flights;

pub use airport_index::*;
pub use airports::*;
pub use countries::*;
pub use datasets::*;
pub use error::*;
pub use flights::*;
