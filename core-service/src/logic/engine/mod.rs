//! Disaster Engine - multi-hazard orchestration
//!
//! Owns the config, the zone registry and one predictor per hazard.
//! Constructed empty; models appear through `train_all`, `load_models`
//! or lazy first use.

mod assessment;
mod cascade;
mod region;
mod status;


use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::logic::config::EngineConfig;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::HazardKind;
use crate::logic::geo::GeoPoint;
use crate::logic::hazard::{
    FloodModel, FloodPrediction, PredictionInput, Predictor, SeismicModel, SeismicPrediction,
    TsunamiModel, TsunamiPrediction,
};
use crate::logic::model::TrainingReport;
use crate::logic::zones::ZoneRegistry;

pub use assessment::{Assessment, AssessmentRequest, AssessmentSummary};
pub use cascade::CascadeDecision;
pub use region::{HeatmapLayer, RegionMap, RegionRequest};
pub use status::EngineStatus;

/// Soil moisture assumed for series steps without a reading
pub const DEFAULT_SERIES_SOIL_MOISTURE: f64 = 0.5;

/// A coast point for multi-coast tsunami impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoastalSite {
    pub name: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoastalImpact {
    pub site: String,
    /// Great-circle distance from the epicenter
    pub distance_km: f64,
    pub prediction: TsunamiPrediction,
}

pub struct DisasterEngine {
    config: EngineConfig,
    zones: Arc<ZoneRegistry>,
    seismic: Predictor<SeismicModel>,
    flood: Predictor<FloodModel>,
    tsunami: Predictor<TsunamiModel>,
}

/// Distinct but reproducible stream per hazard
fn hazard_seed(seed: Option<u64>, hazard: HazardKind) -> Option<u64> {
    seed.map(|s| s.wrapping_add(hazard as u64))
}

impl DisasterEngine {
    pub fn new(config: EngineConfig) -> HazardResult<Self> {
        Self::with_zones(config, Arc::new(ZoneRegistry::builtin().clone()))
    }

    pub fn with_zones(config: EngineConfig, zones: Arc<ZoneRegistry>) -> HazardResult<Self> {
        config.validate()?;
        let match_km = config.zones.max_match_distance_km;
        let lazy = config.lazy_training;

        let seismic = Predictor::new(
            SeismicModel::new(config.seismic.clone(), match_km)?,
            Arc::clone(&zones),
            hazard_seed(config.seed, HazardKind::Seismic),
            lazy,
        );
        let flood = Predictor::new(
            FloodModel::new(config.flood.clone(), match_km)?,
            Arc::clone(&zones),
            hazard_seed(config.seed, HazardKind::Flood),
            lazy,
        );
        let tsunami = Predictor::new(
            TsunamiModel::new(config.tsunami.clone())?,
            Arc::clone(&zones),
            hazard_seed(config.seed, HazardKind::Tsunami),
            lazy,
        );

        log::info!(
            "Disaster engine ready ({} zones, seed {:?}, lazy training {})",
            zones.len(),
            config.seed,
            lazy
        );

        Ok(Self {
            config,
            zones,
            seismic,
            flood,
            tsunami,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn seismic(&self) -> &Predictor<SeismicModel> {
        &self.seismic
    }

    pub fn flood(&self) -> &Predictor<FloodModel> {
        &self.flood
    }

    pub fn tsunami(&self) -> &Predictor<TsunamiModel> {
        &self.tsunami
    }

    // ========================================================================
    // MODEL LIFECYCLE
    // ========================================================================

    pub fn train_all(&self) -> HazardResult<Vec<TrainingReport>> {
        log::info!("Training all hazard models");
        Ok(vec![self.seismic.train()?, self.flood.train()?, self.tsunami.train()?])
    }

    pub fn is_trained(&self) -> bool {
        self.seismic.is_trained() && self.flood.is_trained() && self.tsunami.is_trained()
    }

    /// Write one artifact per hazard; every model must be trained
    pub fn save_models(&self, dir: &Path) -> HazardResult<Vec<PathBuf>> {
        let paths = vec![self.seismic.save(dir)?, self.flood.save(dir)?, self.tsunami.save(dir)?];
        log::info!("Saved {} models to {}", paths.len(), dir.display());
        Ok(paths)
    }

    pub fn load_models(&self, dir: &Path) -> HazardResult<()> {
        self.seismic.load(dir)?;
        self.flood.load(dir)?;
        self.tsunami.load(dir)?;
        log::info!("Loaded models from {}", dir.display());
        Ok(())
    }

    // ========================================================================
    // SINGLE-HAZARD PREDICTIONS
    // ========================================================================

    pub fn predict_seismic(&self, input: &PredictionInput) -> HazardResult<SeismicPrediction> {
        self.seismic.predict(input)
    }

    pub fn predict_flood(&self, input: &PredictionInput) -> HazardResult<FloodPrediction> {
        self.flood.predict(input)
    }

    pub fn predict_tsunami(&self, input: &PredictionInput) -> HazardResult<TsunamiPrediction> {
        self.tsunami.predict(input)
    }

    /// One flood prediction per rainfall step; soil moisture (and antecedent
    /// moisture) follow `soil_moisture`, padded with a neutral default
    pub fn flood_series(
        &self,
        location: GeoPoint,
        rainfall_mm: &[f64],
        soil_moisture: &[f64],
    ) -> HazardResult<Vec<FloodPrediction>> {
        if rainfall_mm.is_empty() {
            return Err(HazardError::invalid("rainfall series is empty"));
        }

        let inputs: Vec<PredictionInput> = rainfall_mm
            .iter()
            .enumerate()
            .map(|(i, rain)| {
                let soil = soil_moisture
                    .get(i)
                    .copied()
                    .unwrap_or(DEFAULT_SERIES_SOIL_MOISTURE);
                PredictionInput::new(location)
                    .with("rainfall_mm", *rain)
                    .with("soil_moisture", soil)
                    .with("antecedent_moisture", soil)
            })
            .collect();

        self.flood.predict_batch(&inputs)
    }

    /// Tsunami impact of one event on several coast points
    pub fn tsunami_coastal_impact(
        &self,
        epicenter: GeoPoint,
        magnitude: f64,
        depth_km: f64,
        sites: &[CoastalSite],
    ) -> HazardResult<Vec<CoastalImpact>> {
        epicenter.validate()?;
        if sites.is_empty() {
            return Err(HazardError::invalid("no coastal sites given"));
        }

        sites
            .iter()
            .map(|site| {
                site.location.validate()?;
                let distance_km = epicenter.distance_km(&site.location);
                let input = PredictionInput::new(site.location)
                    .with("earthquake_magnitude", magnitude)
                    .with("epicenter_depth_km", depth_km)
                    .with("distance_to_coast_km", distance_km);
                let prediction = self
                    .tsunami
                    .predict(&input)
                    .map_err(|e| e.with_context(&format!("coastal site '{}'", site.name)))?;
                Ok(CoastalImpact {
                    site: site.name.clone(),
                    distance_km,
                    prediction,
                })
            })
            .collect()
    }
}
