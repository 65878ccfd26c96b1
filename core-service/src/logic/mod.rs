//! Prediction pipeline
//!
//! Leaves first: geo/features/config → synthetic + model → derived + zones
//! → hazard predictors → engine, alerts and reports.

pub mod alerts;
pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod features;
pub mod geo;
pub mod hazard;
pub mod model;
pub mod report;
pub mod synthetic;
pub mod zones;
