//! Regressor seam
//!
//! `Ensemble` is the fitted state owned by a `TrainedModel`; both variants
//! share the `Regressor` trait so the pipeline never matches on them.

use ndarray::ArrayView2;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::boosting::GradientBoosting;
use super::forest::RandomForest;
use super::tree::TreeParams;
use crate::logic::config::EnsembleConfig;
use crate::logic::error::{HazardError, HazardResult};

pub trait Regressor {
    fn n_features(&self) -> usize;

    /// Caller guarantees the row has `n_features` values
    fn predict_row(&self, row: &[f64]) -> f64;

    /// Unnormalised squared-error decrease per feature
    fn feature_importance(&self) -> Vec<f64>;

    /// Arity-checked prediction
    fn predict(&self, row: &[f64]) -> HazardResult<f64> {
        if row.len() != self.n_features() {
            return Err(HazardError::invalid(format!(
                "model expects {} features, got {}",
                self.n_features(),
                row.len()
            )));
        }
        Ok(self.predict_row(row))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ensemble {
    GradientBoosting(GradientBoosting),
    RandomForest(RandomForest),
}

impl Ensemble {
    pub fn fit(
        config: &EnsembleConfig,
        x: ArrayView2<'_, f64>,
        y: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> HazardResult<Self> {
        config.validate()?;
        match config {
            EnsembleConfig::GradientBoosting {
                n_estimators,
                max_depth,
                learning_rate,
                min_samples_leaf,
            } => {
                let params = TreeParams {
                    max_depth: *max_depth,
                    min_samples_leaf: *min_samples_leaf,
                    max_features: None,
                };
                GradientBoosting::fit(x, y, *n_estimators, *learning_rate, &params, rng)
                    .map(Ensemble::GradientBoosting)
            }
            EnsembleConfig::RandomForest {
                n_estimators,
                max_depth,
                min_samples_leaf,
                max_features,
            } => {
                let params = TreeParams {
                    max_depth: *max_depth,
                    min_samples_leaf: *min_samples_leaf,
                    max_features: *max_features,
                };
                RandomForest::fit(x, y, *n_estimators, &params, rng).map(Ensemble::RandomForest)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Ensemble::GradientBoosting(_) => "gradient_boosting",
            Ensemble::RandomForest(_) => "random_forest",
        }
    }

    pub fn n_trees(&self) -> usize {
        match self {
            Ensemble::GradientBoosting(m) => m.n_trees(),
            Ensemble::RandomForest(m) => m.n_trees(),
        }
    }

    /// Structural check of every tree, for models read from disk
    pub fn validate(&self) -> HazardResult<()> {
        match self {
            Ensemble::GradientBoosting(m) => m.validate(),
            Ensemble::RandomForest(m) => m.validate(),
        }
    }

    fn inner(&self) -> &dyn Regressor {
        match self {
            Ensemble::GradientBoosting(m) => m,
            Ensemble::RandomForest(m) => m,
        }
    }
}

impl Regressor for Ensemble {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.inner().predict_row(row)
    }

    fn feature_importance(&self) -> Vec<f64> {
        self.inner().feature_importance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;
    use ndarray::Array2;

    fn data() -> (Array2<f64>, Vec<f64>) {
        let x = Array2::from_shape_fn((50, 3), |(i, j)| ((i * (j + 2)) % 17) as f64);
        let y = (0..50).map(|i| ((i * 2) % 17) as f64 / 17.0).collect();
        (x, y)
    }

    #[test]
    fn test_fit_dispatches_on_config() {
        let (x, y) = data();
        let mut rng = rng_for(Some(42));

        let gb = Ensemble::fit(&EnsembleConfig::gradient_boosting(10, 3, 0.1), x.view(), &y, &mut rng).unwrap();
        assert_eq!(gb.kind(), "gradient_boosting");
        assert_eq!(gb.n_trees(), 10);

        let rf = Ensemble::fit(&EnsembleConfig::random_forest(7, 4), x.view(), &y, &mut rng).unwrap();
        assert_eq!(rf.kind(), "random_forest");
        assert_eq!(rf.n_trees(), 7);
        assert_eq!(rf.n_features(), 3);
    }

    #[test]
    fn test_predict_checks_arity() {
        let (x, y) = data();
        let model = Ensemble::fit(&EnsembleConfig::random_forest(3, 3), x.view(), &y, &mut rng_for(Some(1))).unwrap();
        assert!(model.predict(&[1.0, 2.0, 3.0]).is_ok());
        assert!(matches!(model.predict(&[1.0, 2.0]), Err(HazardError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (x, y) = data();
        let config = EnsembleConfig::gradient_boosting(10, 0, 0.1);
        assert!(matches!(
            Ensemble::fit(&config, x.view(), &y, &mut rng_for(Some(1))),
            Err(HazardError::Configuration(_))
        ));
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = data();
        let model = Ensemble::fit(&EnsembleConfig::gradient_boosting(5, 3, 0.1), x.view(), &y, &mut rng_for(Some(5))).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: Ensemble = serde_json::from_str(&json).unwrap();
        let row = [3.0, 6.0, 9.0];
        assert!((model.predict_row(&row) - back.predict_row(&row)).abs() < 1e-9);
    }
}
