//! Features Module - per-hazard input schema
//!
//! Layouts fix the feature order once per hazard; vectors carry the
//! layout version + hash so scaler, model and input can be cross-checked.

pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

pub use layout::{FeatureLayout, FeatureSpec, HazardKind, LayoutInfo, LAYOUT_VERSION, LOCATION_FEATURES};
pub use vector::{reject_location_overrides, FeatureOverrides, FeatureVector, FeatureVectorBuilder};
