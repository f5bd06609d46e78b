//! Request handlers, one module per resource.

pub mod search;
pub mod sightings;
pub mod upload;
