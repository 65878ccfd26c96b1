//! Random forest: bootstrap-bagged trees, averaged

use ndarray::ArrayView2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::regressor::Regressor;
use super::tree::{RegressionTree, TreeParams};
use crate::logic::error::{HazardError, HazardResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        n_estimators: usize,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> HazardResult<Self> {
        if y.is_empty() || x.nrows() != y.len() {
            return Err(HazardError::invalid(format!(
                "forest fit: {} rows, {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if n_estimators == 0 {
            return Err(HazardError::config("random forest needs at least one tree"));
        }

        let n = y.len();
        let mut trees = Vec::with_capacity(n_estimators);
        for _ in 0..n_estimators {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(RegressionTree::fit(x, y, &bootstrap, params, rng)?);
        }

        Ok(Self {
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn validate(&self) -> HazardResult<()> {
        if self.trees.is_empty() {
            return Err(HazardError::config("random forest has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| e.with_context(&format!("tree {}", i)))?;
        }
        Ok(())
    }
}

impl Regressor for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
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
