//! Gradient boosting: mean initialisation + shrunken residual trees

use ndarray::ArrayView2;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::regressor::Regressor;
use super::tree::{RegressionTree, TreeParams};
use crate::logic::error::{HazardError, HazardResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        n_estimators: usize,
        learning_rate: f64,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> HazardResult<Self> {
        if y.is_empty() || x.nrows() != y.len() {
            return Err(HazardError::invalid(format!(
                "boosting fit: {} rows, {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        let all: Vec<usize> = (0..y.len()).collect();

        let mut predictions = vec![init; y.len()];
        let mut residuals = vec![0.0; y.len()];
        let mut trees = Vec::with_capacity(n_estimators);

        for _ in 0..n_estimators {
            for ((r, target), pred) in residuals.iter_mut().zip(y).zip(&predictions) {
                *r = target - pred;
            }

            let tree = RegressionTree::fit(x, &residuals, &all, params, rng)?;
            for (pred, row) in predictions.iter_mut().zip(&rows) {
                *pred += learning_rate * tree.predict(row);
            }
            trees.push(tree);
        }

        Ok(Self {
            init,
            learning_rate,
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> HazardResult<()> {
        if self.trees.is_empty() {
            return Err(HazardError::config("gradient boosting model has no trees"));
        }
        if !self.init.is_finite() || !self.learning_rate.is_finite() {
            return Err(HazardError::config("gradient boosting init/learning rate is not finite"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| e.with_context(&format!("tree {}", i)))?;
        }
        Ok(())
    }
}

impl Regressor for GradientBoosting {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.init
            + self.learning_rate * self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    fn feature_importance(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, value) in total.iter_mut().zip(tree.feature_importance()) {
                *acc += value;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;
    use ndarray::Array2;

    #[test]
    fn test_fits_linear_target() {
        let x = Array2::from_shape_fn((100, 2), |(i, j)| if j == 0 { i as f64 / 10.0 } else { (i % 3) as f64 });
        let y: Vec<f64> = (0..100).map(|i| 2.0 * i as f64 / 10.0).collect();
        let params = TreeParams {
            max_depth: 3,
            min_samples_leaf: 1,
            max_features: None,
        };

        let model = GradientBoosting::fit(x.view(), &y, 50, 0.1, &params, &mut rng_for(Some(1))).unwrap();
        assert_eq!(model.n_trees(), 50);
        let pred = model.predict_row(&[5.0, 0.0]);
        assert!((pred - 10.0).abs() < 1.0, "pred = {}", pred);

        let importance = model.feature_importance();
        assert!(importance[0] > importance[1]);
    }

    #[test]
    fn test_more_rounds_reduce_training_error() {
        let x = Array2::from_shape_fn((80, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..80).map(|i| ((i as f64) / 8.0).sin()).collect();
        let params = TreeParams {
            max_depth: 2,
            min_samples_leaf: 1,
            max_features: None,
        };
        let mse = |model: &GradientBoosting| {
            (0..80)
                .map(|i| (model.predict_row(&[i as f64]) - y[i]).powi(2))
                .sum::<f64>()
                / 80.0
        };

        let short = GradientBoosting::fit(x.view(), &y, 5, 0.1, &params, &mut rng_for(Some(1))).unwrap();
        let long = GradientBoosting::fit(x.view(), &y, 80, 0.1, &params, &mut rng_for(Some(1))).unwrap();
        assert!(mse(&long) < mse(&short));
    }

    #[test]
    fn test_zero_rounds_predicts_mean() {
        let x = Array2::from_shape_fn((4, 1), |(i, _)| i as f64);
        let y = [1.0, 2.0, 3.0, 6.0];
        let params = TreeParams {
            max_depth: 2,
            min_samples_leaf: 1,
            max_features: None,
        };
        let model = GradientBoosting::fit(x.view(), &y, 0, 0.1, &params, &mut rng_for(Some(1))).unwrap();
        assert_eq!(model.predict_row(&[0.0]), 3.0);
    }
}
