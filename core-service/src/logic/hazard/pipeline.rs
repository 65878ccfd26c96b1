//! Generic prediction pipeline
//!
//! The trained model is written once per (re)training and read-only
//! afterwards. Lazy first-use training is serialised by a per-predictor
//! mutex with a double-check, so concurrent first calls train only once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::{HazardModel, PredictionInput, Scored};
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::{reject_location_overrides, FeatureVector, HazardKind};
use crate::logic::model::storage::{load_model, model_path, save_model};
use crate::logic::model::{TrainedModel, TrainingReport};
use crate::logic::synthetic::{generate, rng_for};
use crate::logic::zones::ZoneRegistry;

/// Model state for status endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorStatus {
    pub hazard: HazardKind,
    pub trained: bool,
    pub lazy_training: bool,
    pub ensemble: String,
    pub training_samples: usize,
    pub report: Option<TrainingReport>,
}

pub struct Predictor<H: HazardModel> {
    hazard: H,
    zones: Arc<ZoneRegistry>,
    seed: Option<u64>,
    lazy_training: bool,
    trained: RwLock<Option<Arc<TrainedModel>>>,
    training: Mutex<()>,
}

impl<H: HazardModel> Predictor<H> {
    /// Constructed empty; populated by `train`, `load` or first use
    pub fn new(hazard: H, zones: Arc<ZoneRegistry>, seed: Option<u64>, lazy_training: bool) -> Self {
        Self {
            hazard,
            zones,
            seed,
            lazy_training,
            trained: RwLock::new(None),
            training: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> HazardKind {
        self.hazard.kind()
    }

    pub fn hazard(&self) -> &H {
        &self.hazard
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn is_trained(&self) -> bool {
        self.trained.read().is_some()
    }

    pub fn model(&self) -> Option<Arc<TrainedModel>> {
        self.trained.read().clone()
    }

    pub fn status(&self) -> PredictorStatus {
        let model = self.model();
        let config = self.hazard.config();
        PredictorStatus {
            hazard: self.kind(),
            trained: model.is_some(),
            lazy_training: self.lazy_training,
            ensemble: config.ensemble.name().to_string(),
            training_samples: config.training_samples,
            report: model.map(|m| m.report.clone()),
        }
    }

    // ------------------------------------------------------------------------
    // Training
    // ------------------------------------------------------------------------

    fn fit(&self) -> HazardResult<TrainedModel> {
        let config = self.hazard.config();
        let mut rng = rng_for(self.seed);
        let set = generate(self.hazard.samples(), &self.zones, config.training_samples, &mut rng)?;
        TrainedModel::train(&set, config, self.seed, &mut rng)
    }

    /// (Re)train from fresh synthetic data, replacing any previous model
    pub fn train(&self) -> HazardResult<TrainingReport> {
        let _guard = self.training.lock();
        let model = self.fit()?;
        let report = model.report.clone();
        *self.trained.write() = Some(Arc::new(model));
        Ok(report)
    }

    fn ensure_trained(&self) -> HazardResult<Arc<TrainedModel>> {
        if let Some(model) = self.trained.read().as_ref() {
            return Ok(Arc::clone(model));
        }
        if !self.lazy_training {
            return Err(HazardError::NotTrained {
                hazard: self.kind().as_str(),
            });
        }

        let _guard = self.training.lock();
        // another caller may have finished training while we waited
        if let Some(model) = self.trained.read().as_ref() {
            return Ok(Arc::clone(model));
        }

        log::info!("{} model not trained yet, training on first use", self.kind());
        let model = Arc::new(self.fit()?);
        *self.trained.write() = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Install an externally trained/loaded model after consistency checks
    pub fn install(&self, model: TrainedModel) -> HazardResult<()> {
        if model.hazard != self.kind() {
            return Err(HazardError::invalid(format!(
                "cannot install a {} model into the {} predictor",
                model.hazard,
                self.kind()
            )));
        }
        model.check_consistency()?;
        let _guard = self.training.lock();
        *self.trained.write() = Some(Arc::new(model));
        Ok(())
    }

    pub fn save(&self, dir: &Path) -> HazardResult<PathBuf> {
        let model = self.model().ok_or(HazardError::NotTrained {
            hazard: self.kind().as_str(),
        })?;
        let path = model_path(dir, self.kind());
        save_model(&model, &path)?;
        Ok(path)
    }

    pub fn load(&self, dir: &Path) -> HazardResult<()> {
        let model = load_model(&model_path(dir, self.kind()), self.kind())?;
        self.install(model)
    }

    // ------------------------------------------------------------------------
    // Prediction
    // ------------------------------------------------------------------------

    /// Validated feature vector for a request, without scoring it
    pub fn features(&self, input: &PredictionInput) -> HazardResult<FeatureVector> {
        input.location.validate()?;
        reject_location_overrides(&input.overrides)?;
        self.hazard.features(input, &self.zones)
    }

    /// Regressor output for an already-built vector, clamped to [0, 1]
    pub fn score(&self, vector: &FeatureVector) -> HazardResult<f64> {
        let model = self.ensure_trained()?;
        let raw = model.predict(vector)?;
        // clamp passes NaN through
        if !raw.is_finite() {
            return Err(HazardError::invalid(format!(
                "{} model produced a non-finite score ({})",
                self.kind(),
                raw
            )));
        }
        Ok(raw.clamp(0.0, 1.0))
    }

    pub fn predict(&self, input: &PredictionInput) -> HazardResult<H::Output> {
        let vector = self.features(input)?;
        let score = self.score(&vector)?;

        log::debug!(
            "{} prediction at ({:.3}, {:.3}): score {:.4}",
            self.kind(),
            input.location.latitude,
            input.location.longitude,
            score
        );

        self.hazard.assemble(&Scored {
            input,
            vector: &vector,
            score,
            zones: &self.zones,
        })
    }

    /// All-or-nothing: the first failing input fails the batch
    pub fn predict_batch(&self, inputs: &[PredictionInput]) -> HazardResult<Vec<H::Output>> {
        inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                self.predict(input)
                    .map_err(|e| e.with_context(&format!("batch item {}", i)))
            })
            .collect()
    }
}
