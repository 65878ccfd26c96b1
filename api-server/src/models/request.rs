//! Prediction request bodies
//!
//! Ranges mirror the feature layouts so bad input is rejected with 400
//! before any engine work.

use dispre_core::logic::derived::runoff::LandCover;
use dispre_core::logic::engine::{AssessmentRequest, RegionRequest as EngineRegionRequest};
use dispre_core::logic::features::FeatureOverrides;
use dispre_core::logic::geo::{GeoBox, GeoPoint};
use dispre_core::logic::hazard::PredictionInput;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint { latitude, longitude }
}

fn put(overrides: &mut FeatureOverrides, name: &str, value: Option<f64>) {
    if let Some(v) = value {
        overrides.insert(name.to_string(), v);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EarthquakeRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0, max = 700.0))]
    pub depth_km: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub crustal_strain: Option<f64>,
    /// Any other seismic feature by name
    #[serde(default)]
    pub features: FeatureOverrides,
}

impl EarthquakeRequest {
    pub fn into_input(self) -> PredictionInput {
        let mut overrides = self.features;
        put(&mut overrides, "depth_km", self.depth_km);
        put(&mut overrides, "crustal_strain", self.crustal_strain);
        PredictionInput::new(point(self.latitude, self.longitude)).with_overrides(&overrides)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FloodRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0, max = 500.0))]
    pub rainfall_mm: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub soil_moisture: Option<f64>,
    pub soil_type: Option<LandCover>,
    #[serde(default)]
    pub features: FeatureOverrides,
}

impl FloodRequest {
    pub fn into_input(self) -> PredictionInput {
        let mut overrides = self.features;
        put(&mut overrides, "rainfall_mm", self.rainfall_mm);
        put(&mut overrides, "soil_moisture", self.soil_moisture);
        let mut input = PredictionInput::new(point(self.latitude, self.longitude)).with_overrides(&overrides);
        input.soil_type = self.soil_type;
        input
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TsunamiRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0, max = 10.0))]
    pub earthquake_magnitude: Option<f64>,
    #[validate(range(min = 0.0, max = 700.0))]
    pub epicenter_depth_km: Option<f64>,
    #[validate(range(min = 0.0, max = 20000.0))]
    pub distance_to_coast_km: Option<f64>,
    #[serde(default)]
    pub features: FeatureOverrides,
}

impl TsunamiRequest {
    pub fn into_input(self) -> PredictionInput {
        let mut overrides = self.features;
        put(&mut overrides, "earthquake_magnitude", self.earthquake_magnitude);
        put(&mut overrides, "epicenter_depth_km", self.epicenter_depth_km);
        put(&mut overrides, "distance_to_coast_km", self.distance_to_coast_km);
        PredictionInput::new(point(self.latitude, self.longitude)).with_overrides(&overrides)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AllHazardsRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0, max = 500.0))]
    pub rainfall_mm: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub earthquake_magnitude: Option<f64>,
    pub soil_type: Option<LandCover>,
    #[serde(default)]
    pub features: FeatureOverrides,
}

impl AllHazardsRequest {
    pub fn into_request(self) -> AssessmentRequest {
        let mut request = AssessmentRequest::new(point(self.latitude, self.longitude));
        request.rainfall_mm = self.rainfall_mm;
        request.magnitude = self.earthquake_magnitude;
        request.soil_type = self.soil_type;
        request.overrides = self.features;
        request
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegionRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_min: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat_max: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_min: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon_max: f64,
    #[validate(range(min = 2, max = 50))]
    pub resolution: Option<usize>,
    #[validate(range(min = 0.0, max = 500.0))]
    pub rainfall_mm: Option<f64>,
    #[validate(range(min = 0.0, max = 10.0))]
    pub magnitude: Option<f64>,
}

impl RegionRequest {
    pub fn into_request(self) -> EngineRegionRequest {
        let mut request = EngineRegionRequest::new(GeoBox::new((self.lat_min, self.lat_max), (self.lon_min, self.lon_max)));
        request.resolution = self.resolution;
        request.rainfall_mm = self.rainfall_mm;
        request.magnitude = self.magnitude;
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flood(latitude: f64, rainfall_mm: Option<f64>) -> FloodRequest {
        FloodRequest {
            latitude,
            longitude: 140.0,
            rainfall_mm,
            soil_moisture: None,
            soil_type: None,
            features: FeatureOverrides::new(),
        }
    }

    #[test]
    fn test_ranges() {
        assert!(flood(35.0, Some(75.0)).validate().is_ok());
        assert!(flood(35.0, None).validate().is_ok());
        assert!(flood(200.0, Some(75.0)).validate().is_err());
        assert!(flood(35.0, Some(-1.0)).validate().is_err());
    }

    #[test]
    fn test_named_fields_win_over_feature_map() {
        let mut request = flood(35.0, Some(75.0));
        request.features.insert("rainfall_mm".to_string(), 10.0);
        request.features.insert("slope_degrees".to_string(), 2.0);

        let input = request.into_input();
        assert_eq!(input.overrides["rainfall_mm"], 75.0);
        assert_eq!(input.overrides["slope_degrees"], 2.0);
    }

    #[test]
    fn test_body_defaults() {
        let body: AllHazardsRequest =
            serde_json::from_str(r#"{"latitude": 35.0, "longitude": 140.0, "rainfall_mm": 75}"#).unwrap();
        assert!(body.validate().is_ok());
        let request = body.into_request();
        assert_eq!(request.rainfall_mm, Some(75.0));
        assert!(request.magnitude.is_none());
    }
}
