//! Regional heatmaps over a lat/lon grid
//!
//! Seismic and flood layers score every cell with the trained models;
//! the tsunami layer is the closed-form wave height from a source at the
//! region centre.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DisasterEngine;
use crate::logic::derived::wave::max_wave_height_m;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::layout::{seismic, SEISMIC_LAYOUT};
use crate::logic::features::FeatureVector;
use crate::logic::geo::{GeoBox, GeoPoint};
use crate::logic::hazard::PredictionInput;

/// Rupture depth assumed for grid cells
pub const CELL_DEPTH_KM: f64 = 15.0;
/// Tsunami source depth
pub const SOURCE_DEPTH_KM: f64 = 20.0;
pub const SOURCE_OCEAN_DEPTH_M: f64 = 2000.0;
pub const DEFAULT_SOURCE_MAGNITUDE: f64 = 7.0;
/// Cells farther than this from the source get zero wave height
pub const MAX_PROPAGATION_KM: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRequest {
    pub bounds: GeoBox,
    /// Cells per axis
    #[serde(default)]
    pub resolution: Option<usize>,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    /// Magnitude of the source at the region centre
    #[serde(default)]
    pub magnitude: Option<f64>,
}

impl RegionRequest {
    pub fn new(bounds: GeoBox) -> Self {
        Self {
            bounds,
            resolution: None,
            rainfall_mm: None,
            magnitude: None,
        }
    }
}

/// One grid layer, `values[i][j]` at (latitudes[i], longitudes[j])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapLayer {
    pub name: String,
    pub unit: String,
    pub values: Vec<Vec<f64>>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Cell with the highest value
    pub hotspot: GeoPoint,
}

impl HeatmapLayer {
    fn new(name: &str, unit: &str, values: Vec<Vec<f64>>, latitudes: &[f64], longitudes: &[f64]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut hotspot = (0, 0);

        for (i, row) in values.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                min = min.min(v);
                if v > max {
                    max = v;
                    hotspot = (i, j);
                }
                sum += v;
            }
        }

        let count = (latitudes.len() * longitudes.len()).max(1) as f64;
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            values,
            min,
            max,
            mean: sum / count,
            hotspot: GeoPoint {
                latitude: latitudes[hotspot.0],
                longitude: longitudes[hotspot.1],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionMap {
    pub bounds: GeoBox,
    pub resolution: usize,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub source: GeoPoint,
    pub source_magnitude: f64,
    pub seismic_risk: HeatmapLayer,
    pub flood_risk: HeatmapLayer,
    pub tsunami_wave_height: HeatmapLayer,
    pub generated_at: DateTime<Utc>,
}

impl DisasterEngine {
    fn region_resolution(&self, requested: Option<usize>) -> HazardResult<usize> {
        let limits = &self.config.region;
        let resolution = requested.unwrap_or(limits.default_resolution);
        if resolution < 2 || resolution > limits.max_resolution {
            return Err(HazardError::invalid(format!(
                "resolution {} outside [2, {}]",
                resolution, limits.max_resolution
            )));
        }
        Ok(resolution)
    }

    fn seismic_cell(&self, point: GeoPoint) -> HazardResult<f64> {
        let vector = FeatureVector::builder(&SEISMIC_LAYOUT)
            .location(point)
            .set_index(seismic::DEPTH_KM, CELL_DEPTH_KM)
            .build()?;
        self.seismic.score(&vector)
    }

    fn flood_cell(&self, point: GeoPoint, rainfall_mm: Option<f64>) -> HazardResult<f64> {
        let mut input = PredictionInput::new(point);
        if let Some(rain) = rainfall_mm {
            input = input.with("rainfall_mm", rain);
        }
        let vector = self.flood.features(&input)?;
        self.flood.score(&vector)
    }

    fn tsunami_cell(&self, source: &GeoPoint, point: &GeoPoint, magnitude: f64) -> HazardResult<f64> {
        let distance = source.distance_km(point);
        if distance > MAX_PROPAGATION_KM {
            return Ok(0.0);
        }
        max_wave_height_m(
            magnitude,
            SOURCE_DEPTH_KM,
            SOURCE_OCEAN_DEPTH_M,
            distance,
            self.config.tsunami.physics.max_wave_height_m,
        )
    }

    /// Heatmaps over `bounds`; cells are independent and share the read-only models
    pub fn predict_region(&self, request: &RegionRequest) -> HazardResult<RegionMap> {
        request.bounds.validate()?;
        let resolution = self.region_resolution(request.resolution)?;
        let magnitude = request.magnitude.unwrap_or(DEFAULT_SOURCE_MAGNITUDE);
        if !(0.0..=10.0).contains(&magnitude) {
            return Err(HazardError::invalid(format!("magnitude {} outside [0, 10]", magnitude)));
        }

        let (latitudes, longitudes) = request.bounds.grid(resolution);
        let source = request.bounds.center();
        log::info!(
            "Region heatmaps: {}x{} cells, source M{:.1} at {}",
            resolution,
            resolution,
            magnitude,
            source.label()
        );

        let mut seismic = Vec::with_capacity(resolution);
        let mut flood = Vec::with_capacity(resolution);
        let mut tsunami = Vec::with_capacity(resolution);
        for &lat in &latitudes {
            let mut seismic_row = Vec::with_capacity(resolution);
            let mut flood_row = Vec::with_capacity(resolution);
            let mut tsunami_row = Vec::with_capacity(resolution);
            for &lon in &longitudes {
                let point = GeoPoint::new(lat, lon)?;
                seismic_row.push(self.seismic_cell(point)?);
                flood_row.push(self.flood_cell(point, request.rainfall_mm)?);
                tsunami_row.push(self.tsunami_cell(&source, &point, magnitude)?);
            }
            seismic.push(seismic_row);
            flood.push(flood_row);
            tsunami.push(tsunami_row);
        }

        Ok(RegionMap {
            bounds: request.bounds,
            resolution,
            seismic_risk: HeatmapLayer::new("seismic_risk", "score", seismic, &latitudes, &longitudes),
            flood_risk: HeatmapLayer::new("flood_risk", "score", flood, &latitudes, &longitudes),
            tsunami_wave_height: HeatmapLayer::new("tsunami_wave_height", "m", tsunami, &latitudes, &longitudes),
            latitudes,
            longitudes,
            source,
            source_magnitude: magnitude,
            generated_at: Utc::now(),
        })
    }
}
