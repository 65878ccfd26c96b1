//! Flood hazard: SCS runoff, standing water, color-coded warnings
//!
//! The flood layout has no coordinates; the location only drives the
//! regional river-distance default and the basin lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeatureSnapshot, HazardModel, PredictionInput, Scored};
use crate::logic::config::{FloodConfig, ModelConfig};
use crate::logic::derived::clip01;
use crate::logic::derived::runoff::{
    affected_area_km2, scs_runoff_mm, terrain_exposure, water_depth_m, LandCover, TerrainExposure,
};
use crate::logic::error::HazardResult;
use crate::logic::features::layout::{flood as idx, FLOOD_LAYOUT};
use crate::logic::features::{FeatureVector, HazardKind};
use crate::logic::geo::GeoPoint;
use crate::logic::model::{RiskLevel, WarningLevel};
use crate::logic::synthetic::flood::FloodSamples;
use crate::logic::synthetic::SampleSource;
use crate::logic::zones::{ZoneCategory, ZoneMatch, ZoneRegistry};

/// River distance assumed for points inside a registry basin
pub const BASIN_RIVER_DISTANCE_KM: f64 = 5.0;

/// Rainfall at which the warning blend saturates
const WARNING_RAINFALL_MM: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodPrediction {
    pub location: GeoPoint,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub warning_level: WarningLevel,
    pub flood_probability: f64,
    pub rainfall_mm: f64,
    pub runoff_mm: f64,
    pub curve_number: f64,
    pub land_cover: LandCover,
    pub water_depth_m: f64,
    pub affected_area_km2: f64,
    pub terrain_exposure: TerrainExposure,
    pub river_basin: Option<ZoneMatch>,
    pub recommendation: String,
    pub features: FeatureSnapshot,
    pub predicted_at: DateTime<Utc>,
}

pub fn flood_recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::None => "Routine monitoring. No immediate action needed.",
        RiskLevel::Low => "Monitor weather forecasts. Prepare evacuation routes.",
        RiskLevel::Moderate | RiskLevel::Elevated => "Alert issued. Review emergency plans. Prepare shelters.",
        RiskLevel::High => "Warning issued. Begin pre-positioning of resources.",
        RiskLevel::VeryHigh => "Flood Watch active. Activate emergency operations center.",
        RiskLevel::Critical => "FLOOD WARNING - Evacuate immediately. All personnel to safe zones.",
    }
}

/// Score blended with raw rainfall so heavy rain alone can raise the warning
pub fn warning_score(risk_score: f64, rainfall_mm: f64) -> f64 {
    0.6 * risk_score + 0.4 * clip01(rainfall_mm / WARNING_RAINFALL_MM)
}

pub struct FloodModel {
    config: FloodConfig,
    max_match_distance_km: f64,
    samples: FloodSamples,
}

impl FloodModel {
    pub fn new(config: FloodConfig, max_match_distance_km: f64) -> HazardResult<Self> {
        Ok(Self {
            config,
            max_match_distance_km,
            samples: FloodSamples::new()?,
        })
    }
}

impl HazardModel for FloodModel {
    type Output = FloodPrediction;

    fn kind(&self) -> HazardKind {
        HazardKind::Flood
    }

    fn config(&self) -> &ModelConfig {
        &self.config.model
    }

    fn samples(&self) -> &dyn SampleSource {
        &self.samples
    }

    fn features(&self, input: &PredictionInput, zones: &ZoneRegistry) -> HazardResult<FeatureVector> {
        let mut builder = FeatureVector::builder(&FLOOD_LAYOUT);
        if zones.containing(ZoneCategory::FloodBasin, &input.location).is_some() {
            builder = builder.set_index(idx::RIVER_DISTANCE_KM, BASIN_RIVER_DISTANCE_KM);
        }
        for (name, value) in &input.overrides {
            builder = builder.set(name, *value);
        }
        builder.build()
    }

    fn assemble(&self, scored: &Scored<'_>) -> HazardResult<FloodPrediction> {
        let table = &self.config.model.risk_levels;
        let v = scored.vector;
        let location = scored.input.location;

        let rainfall = v.value(idx::RAINFALL_MM);
        let elevation = v.value(idx::ELEVATION_M);
        let slope = v.value(idx::SLOPE_DEGREES);

        let land_cover = LandCover::resolve(scored.input.soil_type.unwrap_or_default(), v.value(idx::URBANIZATION));
        let curve_number = land_cover.curve_number();
        let runoff = scs_runoff_mm(rainfall, curve_number)?;
        let depth = water_depth_m(rainfall, v.value(idx::SOIL_MOISTURE), elevation, slope)?;
        let area = affected_area_km2(scored.score, elevation, slope)?;
        let risk_level = table.classify(scored.score);

        Ok(FloodPrediction {
            location,
            risk_score: scored.score,
            risk_level,
            confidence: table.confidence(scored.score),
            warning_level: self
                .config
                .warning_levels
                .classify(warning_score(scored.score, rainfall)),
            flood_probability: (1.2 * scored.score).min(1.0),
            rainfall_mm: rainfall,
            runoff_mm: runoff,
            curve_number,
            land_cover,
            water_depth_m: depth,
            affected_area_km2: area,
            terrain_exposure: terrain_exposure(elevation),
            river_basin: scored
                .zones
                .nearest(ZoneCategory::FloodBasin, &location, self.max_match_distance_km),
            recommendation: flood_recommendation(risk_level).to_string(),
            features: v.named_values(),
            predicted_at: Utc::now(),
        })
    }
}
