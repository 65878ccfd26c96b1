//! DISPRE Core - Disaster Prediction Engine
//!
//! Multi-hazard (seismic, flood, tsunami) risk estimation from a small set of
//! numeric features, using ensemble regressors trained on synthetic data.
//!
//! ## Layout
//! - `logic::features` - feature layouts and versioned feature vectors
//! - `logic::synthetic` - seeded synthetic training data
//! - `logic::model` - scaler, regression trees, ensembles, thresholds
//! - `logic::derived` - closed-form physical quantities
//! - `logic::zones` - static geophysical zone registry
//! - `logic::hazard` - generic prediction pipeline + per-hazard models
//! - `logic::engine` - multi-hazard orchestration with cascade coupling

pub mod constants;
pub mod logic;

pub use logic::config::EngineConfig;
pub use logic::engine::DisasterEngine;
pub use logic::error::{HazardError, HazardResult};
pub use logic::geo::GeoPoint;
