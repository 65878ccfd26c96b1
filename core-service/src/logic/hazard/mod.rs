//! Hazard predictors
//!
//! One generic pipeline (`Predictor<H>`): validate → vector → lazily train
//! → scale → regress → classify → derive. Each hazard only supplies its
//! data: sample source, config, and how to assemble its result record.

pub mod flood;
pub mod pipeline;
pub mod seismic;
pub mod tsunami;


use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::logic::config::ModelConfig;
use crate::logic::derived::runoff::LandCover;
use crate::logic::error::HazardResult;
use crate::logic::features::{FeatureOverrides, FeatureVector, HazardKind};
use crate::logic::geo::GeoPoint;
use crate::logic::synthetic::SampleSource;
use crate::logic::zones::ZoneRegistry;

pub use flood::{FloodModel, FloodPrediction};
pub use pipeline::{Predictor, PredictorStatus};
pub use seismic::{SeismicModel, SeismicPrediction};
pub use tsunami::{MagnitudeSource, TsunamiModel, TsunamiPrediction};

/// Raw (unscaled) inputs echoed back with a result
pub type FeatureSnapshot = std::collections::BTreeMap<String, f64>;

// ============================================================================
// INPUT
// ============================================================================

/// Location plus optional named feature overrides.
/// Fields a hazard does not use are ignored by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub location: GeoPoint,
    #[serde(default)]
    pub overrides: FeatureOverrides,
    /// Flood: land cover for the curve number (default loam)
    #[serde(default)]
    pub soil_type: Option<LandCover>,
    /// Tsunami: where `earthquake_magnitude` came from
    #[serde(default)]
    pub magnitude_source: MagnitudeSource,
}

impl PredictionInput {
    pub fn new(location: GeoPoint) -> Self {
        Self {
            location,
            overrides: FeatureOverrides::new(),
            soil_type: None,
            magnitude_source: MagnitudeSource::default(),
        }
    }

    /// Validated coordinates
    pub fn at(latitude: f64, longitude: f64) -> HazardResult<Self> {
        Ok(Self::new(GeoPoint::new(latitude, longitude)?))
    }

    pub fn with(mut self, feature: &str, value: f64) -> Self {
        self.overrides.insert(feature.to_string(), value);
        self
    }

    pub fn with_overrides(mut self, overrides: &FeatureOverrides) -> Self {
        self.overrides
            .extend(overrides.iter().map(|(k, v)| (k.clone(), *v)));
        self
    }

    pub fn with_soil_type(mut self, soil_type: LandCover) -> Self {
        self.soil_type = Some(soil_type);
        self
    }
}

// ============================================================================
// HAZARD MODEL SEAM
// ============================================================================

/// What a predictor hands the hazard after scoring
pub struct Scored<'a> {
    pub input: &'a PredictionInput,
    pub vector: &'a FeatureVector,
    /// Regressor output clamped to [0, 1]
    pub score: f64,
    pub zones: &'a ZoneRegistry,
}

pub trait HazardModel: Send + Sync + 'static {
    type Output: Serialize + Clone + Debug + Send;

    fn kind(&self) -> HazardKind;

    fn config(&self) -> &ModelConfig;

    fn samples(&self) -> &dyn SampleSource;

    /// Validated feature vector for a request
    fn features(&self, input: &PredictionInput, _zones: &ZoneRegistry) -> HazardResult<FeatureVector> {
        FeatureVector::from_overrides(self.kind().layout(), Some(input.location), &input.overrides)
    }

    /// Classify + derive; fails as a whole, never partially
    fn assemble(&self, scored: &Scored<'_>) -> HazardResult<Self::Output>;
}
