//! Domain logic for UAS sighting reports.
//!
//! This crate has no internal dependencies: it holds the shared types, the
//! geodesy helpers, the MGRS converter, the search predicate composer, sighting
//! field rules and the image upload validation used by the database and API layers.

pub mod error;
pub mod geo;
pub mod mgrs;
pub mod search;
pub mod sighting;
pub mod types;
pub mod upload;
