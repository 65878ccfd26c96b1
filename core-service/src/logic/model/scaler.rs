//! Feature scaler (z-score)
//!
//! Fitted once per training set and stored with the layout it was fitted
//! on, so inference vectors are transformed in exactly the same order.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::{FeatureVector, LayoutInfo};

/// Std-devs below this are treated as constant features
const MIN_STD: f64 = 1e-12;

/// Per-feature (mean, std) learned from one training matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingParameters {
    pub layout: LayoutInfo,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl ScalingParameters {
    pub fn fit(features: &Array2<f64>, layout: LayoutInfo) -> HazardResult<Self> {
        if features.ncols() != layout.feature_count {
            return Err(HazardError::invalid(format!(
                "scaler fit: {} columns for a {}-feature layout",
                features.ncols(),
                layout.feature_count
            )));
        }
        let means = features
            .mean_axis(Axis(0))
            .ok_or_else(|| HazardError::invalid("scaler fit: empty training matrix"))?;
        let stds = features.std_axis(Axis(0), 0.0);

        Ok(Self {
            layout,
            means: means.to_vec(),
            // constant columns pass through centred, not divided by zero
            stds: stds.iter().map(|s| if *s < MIN_STD { 1.0 } else { *s }).collect(),
        })
    }

    /// Loaded parameters must be usable as divisors
    pub fn validate(&self) -> HazardResult<()> {
        if self.stds.len() != self.means.len() {
            return Err(HazardError::config(format!(
                "scaler has {} means but {} std-devs",
                self.means.len(),
                self.stds.len()
            )));
        }
        if self.means.iter().any(|m| !m.is_finite()) {
            return Err(HazardError::config("scaler mean is not finite"));
        }
        if self.stds.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(HazardError::config("scaler std-dev must be finite and positive"));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    fn check_arity(&self, n: usize) -> HazardResult<()> {
        if n != self.means.len() {
            return Err(HazardError::invalid(format!(
                "scaler expects {} features, got {}",
                self.means.len(),
                n
            )));
        }
        Ok(())
    }

    /// Scale a raw row in layout order
    pub fn transform(&self, values: &[f64]) -> HazardResult<Vec<f64>> {
        self.check_arity(values.len())?;
        Ok(values
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(v, (mean, std))| (v - mean) / std)
            .collect())
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> HazardResult<Vec<f64>> {
        self.check_arity(scaled.len())?;
        Ok(scaled
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(z, (mean, std))| z * std + mean)
            .collect())
    }

    /// Scale a validated vector after checking it was built for this layout
    pub fn transform_vector(&self, vector: &FeatureVector) -> HazardResult<Vec<f64>> {
        if vector.hazard != self.layout.hazard {
            return Err(HazardError::invalid(format!(
                "{} vector passed to {} scaler",
                vector.hazard, self.layout.hazard
            )));
        }
        if vector.version != self.layout.version || vector.layout_hash != self.layout.hash {
            return Err(HazardError::LayoutMismatch {
                hazard: self.layout.hazard.to_string(),
                expected_version: self.layout.version,
                expected_hash: self.layout.hash,
                actual_version: vector.version,
                actual_hash: vector.layout_hash,
            });
        }
        self.transform(vector.values())
    }

    pub fn transform_matrix(&self, features: &Array2<f64>) -> HazardResult<Array2<f64>> {
        self.check_arity(features.ncols())?;
        let mut scaled = features.clone();
        for (mut column, (mean, std)) in scaled.columns_mut().into_iter().zip(self.means.iter().zip(&self.stds)) {
            column.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(scaled)
    }
}
