//! Model Module - scaler, tree ensembles, thresholds
//!
//! A `TrainedModel` bundles the fitted ensemble with the scaler and the
//! layout identity it was trained on. They are created, saved and loaded
//! as one unit and never mutated after training.

pub mod boosting;
pub mod forest;
pub mod regressor;
pub mod scaler;
pub mod storage;
pub mod threshold;
pub mod tree;

use std::time::Instant;

use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::logic::config::ModelConfig;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::{FeatureVector, HazardKind, LayoutInfo};
use crate::logic::synthetic::TrainingSet;

pub use regressor::{Ensemble, Regressor};
pub use scaler::ScalingParameters;
pub use threshold::{Level, RiskLevel, ThreatLevel, ThresholdTable, WarningLevel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Share of total squared-error decrease (sums to 1)
    pub importance: f64,
}

/// Training summary, logged and returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub hazard: HazardKind,
    pub samples: usize,
    pub seed: Option<u64>,
    pub ensemble: String,
    pub n_trees: usize,
    /// In-sample fit
    pub rmse: f64,
    pub r_squared: f64,
    pub target_mean: f64,
    /// Sorted, most important first
    pub feature_importance: Vec<FeatureImportance>,
    pub duration_ms: u64,
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    pub fn top_feature(&self) -> Option<&str> {
        self.feature_importance.first().map(|f| f.feature.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub hazard: HazardKind,
    pub layout: LayoutInfo,
    pub scaler: ScalingParameters,
    pub ensemble: Ensemble,
    pub report: TrainingReport,
}

impl TrainedModel {
    /// Fit scaler + ensemble on a generated training set
    pub fn train(
        set: &TrainingSet,
        config: &ModelConfig,
        seed: Option<u64>,
        rng: &mut ChaCha8Rng,
    ) -> HazardResult<Self> {
        if set.is_empty() {
            return Err(HazardError::invalid("cannot train on an empty training set"));
        }
        let started = Instant::now();
        let hazard = set.layout.hazard;

        let raw = set.features();
        let targets = set.targets().to_vec();
        let scaler = ScalingParameters::fit(&raw, set.layout.clone())?;
        let scaled = scaler.transform_matrix(&raw)?;

        let ensemble = Ensemble::fit(&config.ensemble, scaled.view(), &targets, rng)?;

        let predictions: Vec<f64> = scaled
            .rows()
            .into_iter()
            .map(|row| ensemble.predict_row(&row.to_vec()))
            .collect();
        let (rmse, r_squared) = fit_quality(&targets, &predictions);

        let report = TrainingReport {
            hazard,
            samples: set.len(),
            seed,
            ensemble: ensemble.kind().to_string(),
            n_trees: ensemble.n_trees(),
            rmse,
            r_squared,
            target_mean: set.target_mean(),
            feature_importance: normalised_importance(&set.layout.feature_names, ensemble.feature_importance()),
            duration_ms: started.elapsed().as_millis() as u64,
            trained_at: Utc::now(),
        };

        log::info!(
            "Trained {} model: {} samples, seed {:?}, {} x{} trees, RMSE {:.4}, R² {:.3} in {} ms",
            hazard,
            report.samples,
            seed,
            report.ensemble,
            report.n_trees,
            rmse,
            r_squared,
            report.duration_ms
        );

        Ok(Self {
            hazard,
            layout: set.layout.clone(),
            scaler,
            ensemble,
            report,
        })
    }

    /// Raw continuous output for a validated vector
    pub fn predict(&self, vector: &FeatureVector) -> HazardResult<f64> {
        vector.validate_against(self.hazard.layout())?;
        let scaled = self.scaler.transform_vector(vector)?;
        self.ensemble.predict(&scaled)
    }

    /// Scaler, ensemble and stored layout all agree with the current layout,
    /// and every tree is structurally sound
    pub fn check_consistency(&self) -> HazardResult<()> {
        self.layout.validate_current()?;
        if self.layout.hazard != self.hazard || self.scaler.layout != self.layout {
            return Err(HazardError::LayoutMismatch {
                hazard: self.hazard.to_string(),
                expected_version: self.layout.version,
                expected_hash: self.layout.hash,
                actual_version: self.scaler.layout.version,
                actual_hash: self.scaler.layout.hash,
            });
        }
        if self.scaler.len() != self.layout.feature_count
            || self.ensemble.n_features() != self.layout.feature_count
        {
            return Err(HazardError::invalid(format!(
                "{} model has {} scaler / {} ensemble features for a {}-feature layout",
                self.hazard,
                self.scaler.len(),
                self.ensemble.n_features(),
                self.layout.feature_count
            )));
        }
        self.scaler.validate()?;
        self.ensemble
            .validate()
            .map_err(|e| e.with_context(&format!("{} model", self.hazard)))
    }
}

fn fit_quality(targets: &[f64], predictions: &[f64]) -> (f64, f64) {
    let n = targets.len() as f64;
    let mean = targets.iter().sum::<f64>() / n;
    let ss_res: f64 = targets
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = targets.iter().map(|t| (t - mean).powi(2)).sum();

    let rmse = (ss_res / n).sqrt();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };
    (rmse, r_squared)
}

fn normalised_importance(names: &[String], raw: Vec<f64>) -> Vec<FeatureImportance> {
    let total: f64 = raw.iter().sum();
    let mut importance: Vec<FeatureImportance> = names
        .iter()
        .zip(raw)
        .map(|(name, value)| FeatureImportance {
            feature: name.clone(),
            importance: if total > 0.0 { value / total } else { 0.0 },
        })
        .collect();
    importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    importance
}
