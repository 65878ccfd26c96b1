use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Gamma};

use super::{distribution_error, SampleSource};
use crate::logic::derived::clip01;
use crate::logic::error::HazardResult;
use crate::logic::features::layout::{flood as idx, FLOOD_LAYOUT};
use crate::logic::features::FeatureLayout;
use crate::logic::zones::ZoneRegistry;

pub struct FloodSamples {
    rainfall: Gamma<f64>,
    elevation: Exp<f64>,
    slope: Exp<f64>,
    river_distance: Exp<f64>,
}

impl FloodSamples {
    pub fn new() -> HazardResult<Self> {
        Ok(Self {
            rainfall: Gamma::new(2.0, 30.0).map_err(distribution_error)?,
            elevation: Exp::new(1.0 / 500.0).map_err(distribution_error)?,
            slope: Exp::new(1.0 / 5.0).map_err(distribution_error)?,
            river_distance: Exp::new(1.0 / 15.0).map_err(distribution_error)?,
        })
    }
}

/// Rainfall dominates; low, flat, near-river, urban and wet ground add up
pub fn flood_ground_truth(features: &[f64]) -> f64 {
    let risk = 0.35 * clip01(features[idx::RAINFALL_MM] / 300.0)
        + 0.1 * clip01(features[idx::SOIL_MOISTURE])
        + 0.1 * clip01(1.0 - features[idx::ELEVATION_M] / 2000.0)
        + 0.1 * clip01(1.0 - features[idx::SLOPE_DEGREES] / 30.0)
        + 0.15 * clip01(1.0 - features[idx::RIVER_DISTANCE_KM] / 50.0)
        + 0.1 * clip01(features[idx::URBANIZATION])
        + 0.05 * (1.0 - clip01(features[idx::DAM_CAPACITY_RATIO]))
        + 0.05 * clip01(features[idx::ANTECEDENT_MOISTURE]);
    clip01(risk)
}

impl SampleSource for FloodSamples {
    fn layout(&self) -> &'static FeatureLayout {
        &FLOOD_LAYOUT
    }

    fn draw(&self, rng: &mut ChaCha8Rng, _zones: &ZoneRegistry) -> Vec<f64> {
        let raw = [
            self.rainfall.sample(rng),
            rng.gen_range(0.0..=1.0),
            self.elevation.sample(rng),
            self.slope.sample(rng),
            self.river_distance.sample(rng),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
        ];
        FLOOD_LAYOUT
            .features
            .iter()
            .zip(raw)
            .map(|(spec, value)| spec.clamp(value))
            .collect()
    }

    fn ground_truth(&self, features: &[f64], _zones: &ZoneRegistry) -> f64 {
        flood_ground_truth(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;

    #[test]
    fn test_default_row_with_75mm_is_moderate() {
        let row = [75.0, 0.4, 500.0, 8.0, 20.0, 0.3, 0.5, 0.4];
        let risk = flood_ground_truth(&row);
        assert!((risk - 0.4408).abs() < 0.001, "risk = {}", risk);
    }

    #[test]
    fn test_rainfall_is_monotonic() {
        let mut row = [0.0, 0.4, 500.0, 8.0, 20.0, 0.3, 0.5, 0.4];
        let mut previous = flood_ground_truth(&row);
        for rain in [50.0, 100.0, 200.0, 299.0] {
            row[idx::RAINFALL_MM] = rain;
            let risk = flood_ground_truth(&row);
            assert!(risk > previous);
            previous = risk;
        }
    }

    #[test]
    fn test_draws_stay_in_range() {
        let source = FloodSamples::new().unwrap();
        let zones = ZoneRegistry::builtin();
        let mut rng = rng_for(Some(42));
        for _ in 0..500 {
            let row = source.draw(&mut rng, zones);
            for (spec, value) in FLOOD_LAYOUT.features.iter().zip(&row) {
                assert!(spec.contains(*value), "{} = {}", spec.name, value);
            }
        }
    }
}
