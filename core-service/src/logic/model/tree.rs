//! CART regression tree
//!
//! Nodes live in a flat `Vec`; splits minimise the weighted squared error
//! using running sums over samples sorted by feature value, with the
//! threshold at the midpoint between neighbouring distinct values.

use ndarray::ArrayView2;
use rand::seq::index::sample;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::logic::error::{HazardError, HazardResult};

/// Feature values closer than this are treated as equal
const VALUE_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Features drawn per split; `None` = all
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        impurity_decrease: f64,
        n_samples: usize,
    },
    Leaf {
        value: f64,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

struct Builder<'a, 'r> {
    x: ArrayView2<'a, f64>,
    y: &'r [f64],
    params: &'r TreeParams,
    rng: &'r mut ChaCha8Rng,
    nodes: Vec<TreeNode>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

impl RegressionTree {
    /// Fit on the rows named by `indices` (duplicates allowed for bootstraps)
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> HazardResult<Self> {
        if x.nrows() != y.len() {
            return Err(HazardError::invalid(format!(
                "tree fit: {} rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if indices.is_empty() {
            return Err(HazardError::invalid("tree fit: no training rows"));
        }
        if indices.iter().any(|&i| i >= x.nrows()) {
            return Err(HazardError::invalid("tree fit: row index out of bounds"));
        }
        if params.max_depth == 0 || params.min_samples_leaf == 0 {
            return Err(HazardError::config("tree depth and min_samples_leaf must be positive"));
        }

        let mut builder = Builder {
            x,
            y,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(indices, 0);

        Ok(Self {
            n_features: x.ncols(),
            nodes: builder.nodes,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Structural check for trees that did not come from `fit`.
    ///
    /// Children must sit after their parent, which rules out cycles and
    /// keeps `predict` in bounds.
    pub fn validate(&self, n_features: usize) -> HazardResult<()> {
        if self.n_features != n_features {
            return Err(HazardError::config(format!(
                "tree expects {} features, model has {}",
                self.n_features, n_features
            )));
        }
        if self.nodes.is_empty() {
            return Err(HazardError::config("tree has no nodes"));
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(HazardError::config(format!("node {}: leaf value {} is not finite", idx, value)));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(HazardError::config(format!(
                            "node {}: feature {} out of range (n_features = {})",
                            idx, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(HazardError::config(format!("node {}: threshold is not finite", idx)));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(HazardError::config(format!(
                                "node {}: child index {} invalid ({} nodes)",
                                idx, child, len
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Caller guarantees `row.len() == n_features`
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Total squared-error decrease per feature (unnormalised)
    pub fn feature_importance(&self) -> Vec<f64> {
        let mut importance = vec![0.0; self.n_features];
        for node in &self.nodes {
            if let TreeNode::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                importance[*feature] += impurity_decrease;
            }
        }
        importance
    }
}

impl Builder<'_, '_> {
    fn leaf(&mut self, indices: &[usize]) -> usize {
        let value = indices.iter().map(|&i| self.y[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(TreeNode::Leaf {
            value,
            n_samples: indices.len(),
        });
        self.nodes.len() - 1
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> usize {
        let min_leaf = self.params.min_samples_leaf;
        if depth >= self.params.max_depth || indices.len() < 2 * min_leaf {
            return self.leaf(indices);
        }

        let first = self.y[indices[0]];
        if indices.iter().all(|&i| (self.y[i] - first).abs() < VALUE_EPSILON) {
            return self.leaf(indices);
        }

        let Some(split) = self.best_split(indices) else {
            return self.leaf(indices);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.x[[i, split.feature]] <= split.threshold);
        if left_rows.is_empty() || right_rows.is_empty() {
            return self.leaf(indices);
        }

        let node = self.nodes.len();
        // placeholder until both children exist
        self.nodes.push(TreeNode::Leaf {
            value: 0.0,
            n_samples: 0,
        });
        let left = self.grow(&left_rows, depth + 1);
        let right = self.grow(&right_rows, depth + 1);

        self.nodes[node] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity_decrease: split.decrease,
            n_samples: indices.len(),
        };
        node
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n = self.x.ncols();
        match self.params.max_features {
            Some(k) if k < n => sample(&mut *self.rng, n, k).into_vec(),
            _ => (0..n).collect(),
        }
    }

    fn best_split(&mut self, indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf;

        let total_sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features() {
            let mut pairs: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.x[[i, feature]], self.y[i]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let (value, target) = pairs[k];
                left_sum += target;
                left_sq += target * target;

                let left_n = k + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }
                let next_value = pairs[k + 1].0;
                if (next_value - value).abs() < VALUE_EPSILON {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / left_n as f64)
                    + (right_sq - right_sum * right_sum / right_n as f64);
                let decrease = parent_sse - sse;

                if decrease > best.as_ref().map_or(VALUE_EPSILON, |b| b.decrease) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (value + next_value) / 2.0,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;
    use ndarray::Array2;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_leaf: 1,
            max_features: None,
        }
    }

    #[test]
    fn test_step_function_is_recovered() {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { 0.5 });
        let y: Vec<f64> = (0..40).map(|i| if i < 20 { 1.0 } else { 3.0 }).collect();
        let rows: Vec<usize> = (0..40).collect();

        let tree = RegressionTree::fit(x.view(), &y, &rows, &params(3), &mut rng_for(Some(1))).unwrap();
        assert_eq!(tree.predict(&[5.0, 0.5]), 1.0);
        assert_eq!(tree.predict(&[30.0, 0.5]), 3.0);
        // one split is enough
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);

        match &tree.nodes()[0] {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 19.5);
            }
            other => panic!("expected split, got {:?}", other),
        }
    }

    #[test]
    fn test_importance_goes_to_informative_feature() {
        let x = Array2::from_shape_fn((60, 3), |(i, j)| match j {
            0 => (i % 7) as f64,
            1 => i as f64,
            _ => ((i * 13) % 5) as f64,
        });
        let y: Vec<f64> = (0..60).map(|i| (i as f64 / 10.0).floor()).collect();
        let rows: Vec<usize> = (0..60).collect();

        let tree = RegressionTree::fit(x.view(), &y, &rows, &params(6), &mut rng_for(Some(1))).unwrap();
        let importance = tree.feature_importance();
        assert!(importance[1] > importance[0] + importance[2]);
    }

    #[test]
    fn test_depth_limit_respected() {
        let x = Array2::from_shape_fn((100, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..100).map(|i| (i as f64).sin()).collect();
        let rows: Vec<usize> = (0..100).collect();

        let tree = RegressionTree::fit(x.view(), &y, &rows, &params(4), &mut rng_for(Some(1))).unwrap();
        assert!(tree.depth() <= 4);
        assert!(tree.n_leaves() <= 16);
    }

    #[test]
    fn test_min_samples_leaf() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let rows: Vec<usize> = (0..10).collect();
        let params = TreeParams {
            max_depth: 10,
            min_samples_leaf: 3,
            max_features: None,
        };

        let tree = RegressionTree::fit(x.view(), &y, &rows, &params, &mut rng_for(Some(1))).unwrap();
        for node in tree.nodes() {
            if let TreeNode::Leaf { n_samples, .. } = node {
                assert!(*n_samples >= 3);
            }
        }
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i + j) as f64);
        let y = vec![0.7; 10];
        let rows: Vec<usize> = (0..10).collect();
        let tree = RegressionTree::fit(x.view(), &y, &rows, &params(5), &mut rng_for(Some(1))).unwrap();
        assert_eq!(tree.nodes().len(), 1);
        assert!((tree.predict(&[3.0, 4.0]) - 0.7).abs() < 1e-12);
    }

    fn stump() -> RegressionTree {
        RegressionTree {
            n_features: 2,
            nodes: vec![
                TreeNode::Split {
                    feature: 1,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                    impurity_decrease: 1.0,
                    n_samples: 4,
                },
                TreeNode::Leaf { value: 0.1, n_samples: 2 },
                TreeNode::Leaf { value: 0.9, n_samples: 2 },
            ],
        }
    }

    #[test]
    fn test_validate_accepts_fitted_tree() {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i * (j + 1)) as f64);
        let y: Vec<f64> = (0..30).map(|i| (i % 4) as f64).collect();
        let rows: Vec<usize> = (0..30).collect();
        let tree = RegressionTree::fit(x.view(), &y, &rows, &params(4), &mut rng_for(Some(2))).unwrap();
        assert!(tree.validate(2).is_ok());
        assert!(stump().validate(2).is_ok());
    }

    #[test]
    fn test_validate_rejects_corrupt_nodes() {
        let mut bad_feature = stump();
        if let TreeNode::Split { feature, .. } = &mut bad_feature.nodes[0] {
            *feature = 99;
        }
        assert!(matches!(bad_feature.validate(2), Err(HazardError::Configuration(_))));

        let mut cycle = stump();
        if let TreeNode::Split { left, .. } = &mut cycle.nodes[0] {
            *left = 0;
        }
        assert!(cycle.validate(2).is_err());

        let mut dangling = stump();
        if let TreeNode::Split { right, .. } = &mut dangling.nodes[0] {
            *right = 7;
        }
        assert!(dangling.validate(2).is_err());

        let mut nan_leaf = stump();
        nan_leaf.nodes[2] = TreeNode::Leaf { value: f64::NAN, n_samples: 2 };
        assert!(nan_leaf.validate(2).is_err());

        let empty = RegressionTree { n_features: 2, nodes: Vec::new() };
        assert!(empty.validate(2).is_err());
        assert!(stump().validate(3).is_err());
    }

    #[test]
    fn test_bad_inputs_rejected() {
        let x = Array2::<f64>::zeros((3, 1));
        let mut rng = rng_for(Some(1));
        assert!(RegressionTree::fit(x.view(), &[1.0, 2.0], &[0, 1], &params(2), &mut rng).is_err());
        assert!(RegressionTree::fit(x.view(), &[1.0, 2.0, 3.0], &[], &params(2), &mut rng).is_err());
        assert!(RegressionTree::fit(x.view(), &[1.0, 2.0, 3.0], &[0, 9], &params(2), &mut rng).is_err());
    }
}
