//! Zone Registry - named geophysical regions
//!
//! Read-only reference data: tectonic belts, river basins, subduction zones
//! and coastlines as lat/lon boxes with a risk weight. Used for contextual
//! labels, synthetic targets and the seismic → tsunami cascade.

mod builtin;
pub mod registry;

pub use registry::{Zone, ZoneCategory, ZoneMatch, ZoneRegistry};
