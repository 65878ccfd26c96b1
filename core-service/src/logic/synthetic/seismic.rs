use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal, Uniform};

use super::{distribution_error, draw_location, SampleSource};
use crate::logic::derived::clip01;
use crate::logic::error::HazardResult;
use crate::logic::features::layout::{seismic as idx, SEISMIC_LAYOUT};
use crate::logic::features::FeatureLayout;
use crate::logic::geo::GeoPoint;
use crate::logic::zones::{ZoneCategory, ZoneRegistry};

/// Tectonic weight outside every registry belt
pub const BACKGROUND_TECTONIC_WEIGHT: f64 = 0.1;

pub struct SeismicSamples {
    depth: Exp<f64>,
    days_since_last: Exp<f64>,
    temperature: Normal<f64>,
    pressure: Uniform<f64>,
}

impl SeismicSamples {
    pub fn new() -> HazardResult<Self> {
        Ok(Self {
            depth: Exp::new(1.0 / 15.0).map_err(distribution_error)?,
            days_since_last: Exp::new(1.0 / 30.0).map_err(distribution_error)?,
            temperature: Normal::new(25.0, 10.0).map_err(distribution_error)?,
            pressure: Uniform::new_inclusive(800.0, 1013.0),
        })
    }
}

/// 0.6·tectonic + 0.2·strain + 0.15·plate/10 + 0.05·(1 − e^(−depth/50))
pub fn seismic_ground_truth(features: &[f64], zones: &ZoneRegistry) -> f64 {
    let point = GeoPoint {
        latitude: features[idx::LATITUDE],
        longitude: features[idx::LONGITUDE],
    };
    let tectonic = zones
        .weight_at(ZoneCategory::Tectonic, &point)
        .unwrap_or(BACKGROUND_TECTONIC_WEIGHT);

    let risk = 0.6 * tectonic
        + 0.2 * clip01(features[idx::CRUSTAL_STRAIN])
        + 0.15 * clip01(features[idx::PLATE_MOTION] / 10.0)
        + 0.05 * (1.0 - (-features[idx::DEPTH_KM] / 50.0).exp());
    clip01(risk)
}

impl SampleSource for SeismicSamples {
    fn layout(&self) -> &'static FeatureLayout {
        &SEISMIC_LAYOUT
    }

    fn draw(&self, rng: &mut ChaCha8Rng, zones: &ZoneRegistry) -> Vec<f64> {
        let location = draw_location(rng, zones, &[ZoneCategory::Tectonic]);
        let raw = [
            location.latitude,
            location.longitude,
            self.depth.sample(rng),
            self.days_since_last.sample(rng),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=10.0),
            self.temperature.sample(rng),
            self.pressure.sample(rng),
        ];
        SEISMIC_LAYOUT
            .features
            .iter()
            .zip(raw)
            .map(|(spec, value)| spec.clamp(value))
            .collect()
    }

    fn ground_truth(&self, features: &[f64], zones: &ZoneRegistry) -> f64 {
        seismic_ground_truth(features, zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;

    #[test]
    fn test_japan_defaults_land_in_high_band() {
        let zones = ZoneRegistry::builtin();
        let row = [35.0, 140.0, 10.0, 30.0, 0.5, 5.0, 25.0, 1013.0];
        let risk = seismic_ground_truth(&row, zones);
        assert!((risk - 0.724).abs() < 0.002, "risk = {}", risk);
    }

    #[test]
    fn test_open_ocean_is_background() {
        let zones = ZoneRegistry::builtin();
        let calm = [0.0, -150.0, 10.0, 30.0, 0.0, 0.0, 25.0, 1013.0];
        let risk = seismic_ground_truth(&calm, zones);
        assert!((risk - (0.06 + 0.05 * (1.0 - (-0.2f64).exp()))).abs() < 1e-9);
    }

    #[test]
    fn test_draws_stay_in_range() {
        let source = SeismicSamples::new().unwrap();
        let zones = ZoneRegistry::builtin();
        let mut rng = rng_for(Some(42));
        for _ in 0..500 {
            let row = source.draw(&mut rng, zones);
            for (spec, value) in SEISMIC_LAYOUT.features.iter().zip(&row) {
                assert!(spec.contains(*value), "{} = {}", spec.name, value);
            }
        }
    }
}
