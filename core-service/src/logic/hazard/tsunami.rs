//! Tsunami hazard: shallow-water propagation, wave height, threat level

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{FeatureSnapshot, HazardModel, Scored};
use crate::logic::config::{ModelConfig, TsunamiConfig};
use crate::logic::derived::clip01;
use crate::logic::derived::wave::{
    affected_area_km2, inundation_depth_m, max_wave_height_m, run_up_m, time_to_escape_minutes,
    travel_time_hours, wave_speed_ms,
};
use crate::logic::error::HazardResult;
use crate::logic::features::layout::tsunami as idx;
use crate::logic::features::HazardKind;
use crate::logic::geo::GeoPoint;
use crate::logic::model::{RiskLevel, ThreatLevel};
use crate::logic::synthetic::tsunami::{coastal_vulnerability, TsunamiSamples};
use crate::logic::synthetic::SampleSource;
use crate::logic::zones::ZoneCategory;

/// Wave height at which the risk blend saturates
const SATURATION_HEIGHT_M: f64 = 10.0;

/// Origin of the magnitude fed to the tsunami model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeSource {
    /// Caller-supplied or layout default
    #[default]
    Caller,
    /// Replaced by the seismic model's expected magnitude
    SeismicCascade,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TsunamiPrediction {
    pub location: GeoPoint,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub threat_level: ThreatLevel,
    pub magnitude: f64,
    pub magnitude_source: MagnitudeSource,
    pub wave_height_m: f64,
    pub wave_speed_ms: f64,
    pub wave_speed_kmh: f64,
    pub travel_time_hours: f64,
    pub arrival_time: DateTime<Utc>,
    pub time_to_escape_minutes: f64,
    pub inundation_depth_m: f64,
    pub run_up_m: f64,
    pub affected_area_km2: f64,
    pub coastal_vulnerability: f64,
    pub in_subduction_zone: bool,
    pub subduction_zone: Option<String>,
    pub recommendation: String,
    pub features: FeatureSnapshot,
    pub predicted_at: DateTime<Utc>,
}

pub fn tsunami_recommendation(threat: ThreatLevel, travel_time_hours: f64) -> &'static str {
    match threat {
        ThreatLevel::Advisory => "Monitor earthquake reports. No immediate action needed.",
        ThreatLevel::Watch => "Tsunami Watch issued. Be prepared to move to higher ground.",
        ThreatLevel::Warning => "Tsunami Warning issued. Evacuate immediately to higher ground.",
        ThreatLevel::MajorWarning if travel_time_hours < 1.0 => {
            "MAJOR TSUNAMI WARNING - EVACUATE IMMEDIATELY. Go to nearest high ground NOW!"
        }
        ThreatLevel::MajorWarning => {
            "MAJOR TSUNAMI WARNING - Begin immediate mass evacuation. Move to highest available ground."
        }
    }
}

/// Model score blended with the physical wave height
pub fn risk_blend(risk_score: f64, wave_height_m: f64) -> f64 {
    0.6 * risk_score + 0.4 * clip01(wave_height_m / SATURATION_HEIGHT_M)
}

pub struct TsunamiModel {
    config: TsunamiConfig,
    samples: TsunamiSamples,
}

impl TsunamiModel {
    pub fn new(config: TsunamiConfig) -> HazardResult<Self> {
        Ok(Self {
            config,
            samples: TsunamiSamples::new()?,
        })
    }
}

impl HazardModel for TsunamiModel {
    type Output = TsunamiPrediction;

    fn kind(&self) -> HazardKind {
        HazardKind::Tsunami
    }

    fn config(&self) -> &ModelConfig {
        &self.config.model
    }

    fn samples(&self) -> &dyn SampleSource {
        &self.samples
    }

    fn assemble(&self, scored: &Scored<'_>) -> HazardResult<TsunamiPrediction> {
        let physics = &self.config.physics;
        let v = scored.vector;
        let location = scored.input.location;

        let magnitude = v.value(idx::MAGNITUDE);
        let distance = v.value(idx::DISTANCE_TO_COAST_KM);
        let slope = v.value(idx::COAST_SLOPE);

        let speed = wave_speed_ms(v.value(idx::OCEAN_DEPTH_M), physics.gravity)?;
        let height = max_wave_height_m(
            magnitude,
            v.value(idx::EPICENTER_DEPTH_KM),
            v.value(idx::OCEAN_DEPTH_M),
            distance,
            physics.max_wave_height_m,
        )?;
        let travel = travel_time_hours(distance, speed)?;
        let inundation = inundation_depth_m(height, slope)?;
        let run_up = run_up_m(height, slope, physics.shoaling_factor)?;

        let blended = risk_blend(scored.score, height);
        let risk_level = self.config.model.risk_levels.classify(blended);
        let threat_level = self.config.threat_levels.classify(height);
        let subduction = scored.zones.containing(ZoneCategory::Subduction, &location);

        let predicted_at = Utc::now();
        let arrival_time = predicted_at + Duration::milliseconds((travel * 3_600_000.0).round() as i64);

        Ok(TsunamiPrediction {
            location,
            risk_score: scored.score,
            risk_level,
            confidence: self.config.model.risk_levels.confidence(blended),
            threat_level,
            magnitude,
            magnitude_source: scored.input.magnitude_source,
            wave_height_m: height,
            wave_speed_ms: speed,
            wave_speed_kmh: speed * 3.6,
            travel_time_hours: travel,
            arrival_time,
            time_to_escape_minutes: time_to_escape_minutes(travel, physics.evacuation_buffer_minutes),
            inundation_depth_m: inundation,
            run_up_m: run_up,
            affected_area_km2: affected_area_km2(height, inundation),
            coastal_vulnerability: coastal_vulnerability(scored.zones, &location),
            in_subduction_zone: subduction.is_some(),
            subduction_zone: subduction.map(|z| z.label()),
            recommendation: tsunami_recommendation(threat_level, travel).to_string(),
            features: v.named_values(),
            predicted_at,
        })
    }
}
