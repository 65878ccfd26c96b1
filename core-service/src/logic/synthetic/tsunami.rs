use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp, Normal};

use super::{distribution_error, draw_location, SampleSource};
use crate::logic::derived::clip01;
use crate::logic::error::HazardResult;
use crate::logic::features::layout::{tsunami as idx, TSUNAMI_LAYOUT};
use crate::logic::features::FeatureLayout;
use crate::logic::geo::GeoPoint;
use crate::logic::zones::{ZoneCategory, ZoneRegistry};

/// Source-zone risk outside every subduction zone
pub const BACKGROUND_SOURCE_RISK: f64 = 0.1;
/// Coastal vulnerability outside every registry coastline
pub const DEFAULT_COASTAL_VULNERABILITY: f64 = 0.3;

pub struct TsunamiSamples {
    depth: Exp<f64>,
    coast_distance: Exp<f64>,
    ocean_depth: Exp<f64>,
    water_temperature: Normal<f64>,
    sst_anomaly: Normal<f64>,
}

impl TsunamiSamples {
    pub fn new() -> HazardResult<Self> {
        Ok(Self {
            depth: Exp::new(1.0 / 15.0).map_err(distribution_error)?,
            coast_distance: Exp::new(1.0 / 100.0).map_err(distribution_error)?,
            ocean_depth: Exp::new(1.0 / 3000.0).map_err(distribution_error)?,
            water_temperature: Normal::new(15.0, 8.0).map_err(distribution_error)?,
            sst_anomaly: Normal::new(0.0, 1.0).map_err(distribution_error)?,
        })
    }
}

pub fn source_zone_risk(zones: &ZoneRegistry, point: &GeoPoint) -> f64 {
    zones
        .weight_at(ZoneCategory::Subduction, point)
        .unwrap_or(BACKGROUND_SOURCE_RISK)
}

pub fn coastal_vulnerability(zones: &ZoneRegistry, point: &GeoPoint) -> f64 {
    zones
        .weight_at(ZoneCategory::Coastline, point)
        .unwrap_or(DEFAULT_COASTAL_VULNERABILITY)
}

/// Magnitude first, then shallow ruptures near the coast in known source zones
pub fn tsunami_ground_truth(features: &[f64], zones: &ZoneRegistry) -> f64 {
    let point = GeoPoint {
        latitude: features[idx::LATITUDE],
        longitude: features[idx::LONGITUDE],
    };

    let risk = 0.4 * clip01((features[idx::MAGNITUDE] - 4.0) / 5.0)
        + 0.2 * (-features[idx::EPICENTER_DEPTH_KM] / 50.0).exp()
        + 0.2 * (-features[idx::DISTANCE_TO_COAST_KM] / 200.0).exp()
        + 0.1 * source_zone_risk(zones, &point)
        + 0.1 * coastal_vulnerability(zones, &point);
    clip01(risk)
}

impl SampleSource for TsunamiSamples {
    fn layout(&self) -> &'static FeatureLayout {
        &TSUNAMI_LAYOUT
    }

    fn draw(&self, rng: &mut ChaCha8Rng, zones: &ZoneRegistry) -> Vec<f64> {
        let location = draw_location(rng, zones, &[ZoneCategory::Subduction, ZoneCategory::Coastline]);
        let raw = [
            rng.gen_range(4.0..=9.0),
            self.depth.sample(rng),
            self.coast_distance.sample(rng),
            rng.gen_range(0.001..=0.1),
            self.ocean_depth.sample(rng),
            location.latitude,
            location.longitude,
            self.water_temperature.sample(rng),
            self.sst_anomaly.sample(rng),
        ];
        TSUNAMI_LAYOUT
            .features
            .iter()
            .zip(raw)
            .map(|(spec, value)| spec.clamp(value))
            .collect()
    }

    fn ground_truth(&self, features: &[f64], zones: &ZoneRegistry) -> f64 {
        tsunami_ground_truth(features, zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::synthetic::rng_for;

    #[test]
    fn test_subduction_zone_raises_risk() {
        let zones = ZoneRegistry::builtin();
        let japan = [8.0, 10.0, 50.0, 0.02, 2000.0, 35.0, 142.0, 15.0, 0.0];
        let open_ocean = [8.0, 10.0, 50.0, 0.02, 2000.0, 0.0, -150.0, 15.0, 0.0];
        let diff = tsunami_ground_truth(&japan, zones) - tsunami_ground_truth(&open_ocean, zones);
        // (0.8 − 0.1) + (0.9 − 0.3), both weighted 0.1
        assert!((diff - 0.13).abs() < 1e-9, "diff = {}", diff);
    }

    #[test]
    fn test_magnitude_dominates() {
        let zones = ZoneRegistry::builtin();
        let mut row = [5.0, 10.0, 50.0, 0.02, 2000.0, 0.0, -150.0, 15.0, 0.0];
        let low = tsunami_ground_truth(&row, zones);
        row[idx::MAGNITUDE] = 9.0;
        let high = tsunami_ground_truth(&row, zones);
        assert!((high - low - 0.32).abs() < 1e-9);
    }

    #[test]
    fn test_draws_stay_in_range() {
        let source = TsunamiSamples::new().unwrap();
        let zones = ZoneRegistry::builtin();
        let mut rng = rng_for(Some(42));
        for _ in 0..500 {
            let row = source.draw(&mut rng, zones);
            for (spec, value) in TSUNAMI_LAYOUT.features.iter().zip(&row) {
                assert!(spec.contains(*value), "{} = {}", spec.name, value);
            }
        }
    }
}
