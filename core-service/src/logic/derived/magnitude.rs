//! Seismic magnitude estimate and exceedance probabilities

use serde::{Deserialize, Serialize};

use super::{clip01, logistic};
use crate::logic::error::{require_non_negative, HazardResult};

/// Steepness of the exceedance curves
pub const EXCEEDANCE_STEEPNESS: f64 = 10.0;
/// Risk score at which P(M>5) = 0.5
pub const M5_MIDPOINT: f64 = 0.35;
/// Risk score at which P(M>7) = 0.5
pub const M7_MIDPOINT: f64 = 0.65;

const MAGNITUDE_SPREAD: f64 = 1.5;
const MIN_MAGNITUDE: f64 = 2.0;
const MAX_MAGNITUDE: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeRange {
    pub min: f64,
    pub max: f64,
}

/// 4.5 + 2·clip(depth/50) + 2·strain
pub fn expected_magnitude(depth_km: f64, crustal_strain: f64) -> HazardResult<f64> {
    let depth = require_non_negative("depth_km", depth_km)?;
    Ok(4.5 + 2.0 * clip01(depth / 50.0) + 2.0 * clip01(crustal_strain))
}

pub fn magnitude_range(expected: f64) -> MagnitudeRange {
    MagnitudeRange {
        min: (expected - MAGNITUDE_SPREAD).clamp(MIN_MAGNITUDE, MAX_MAGNITUDE),
        max: (expected + MAGNITUDE_SPREAD).clamp(MIN_MAGNITUDE, MAX_MAGNITUDE),
    }
}

/// Fixed logistic transform of a risk score; not retrained
pub fn exceedance_probability(risk_score: f64, midpoint: f64) -> f64 {
    logistic(EXCEEDANCE_STEEPNESS * (clip01(risk_score) - midpoint))
}

pub fn probability_above_m5(risk_score: f64) -> f64 {
    exceedance_probability(risk_score, M5_MIDPOINT)
}

pub fn probability_above_m7(risk_score: f64) -> f64 {
    exceedance_probability(risk_score, M7_MIDPOINT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_magnitude() {
        assert!((expected_magnitude(10.0, 0.5).unwrap() - 5.9).abs() < 1e-12);
        assert!((expected_magnitude(100.0, 1.0).unwrap() - 8.5).abs() < 1e-12);
        assert!(expected_magnitude(-1.0, 0.5).is_err());
    }

    #[test]
    fn test_range_is_clamped() {
        let range = magnitude_range(8.5);
        assert_eq!(range.min, 7.0);
        assert_eq!(range.max, 9.0);
        assert_eq!(magnitude_range(2.5).min, 2.0);
    }

    #[test]
    fn test_exceedance_curves() {
        assert!((probability_above_m5(0.35) - 0.5).abs() < 1e-12);
        assert!((probability_above_m7(0.65) - 0.5).abs() < 1e-12);

        let mut previous = 0.0;
        for i in 0..=100 {
            let score = i as f64 / 100.0;
            let p5 = probability_above_m5(score);
            let p7 = probability_above_m7(score);
            assert!(p5 > previous);
            assert!(p7 < p5, "P(M>7) must stay below P(M>5)");
            previous = p5;
        }
    }
}
