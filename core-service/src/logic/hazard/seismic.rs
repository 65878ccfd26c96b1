//! Seismic hazard: tectonic risk, magnitude estimate, exceedance curves

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeatureSnapshot, HazardModel, Scored};
use crate::logic::config::{ModelConfig, SeismicConfig};
use crate::logic::derived::magnitude::{
    expected_magnitude, magnitude_range, probability_above_m5, probability_above_m7, MagnitudeRange,
};
use crate::logic::error::HazardResult;
use crate::logic::features::layout::seismic as idx;
use crate::logic::features::HazardKind;
use crate::logic::geo::GeoPoint;
use crate::logic::model::RiskLevel;
use crate::logic::synthetic::seismic::SeismicSamples;
use crate::logic::synthetic::SampleSource;
use crate::logic::zones::{ZoneCategory, ZoneMatch};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeismicPrediction {
    pub location: GeoPoint,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub expected_magnitude: f64,
    pub magnitude_range: MagnitudeRange,
    pub probability_m5_plus: f64,
    pub probability_m7_plus: f64,
    /// Nearest tectonic zone within the configured distance
    pub tectonic_zone: Option<ZoneMatch>,
    pub recommendation: String,
    pub features: FeatureSnapshot,
    pub predicted_at: DateTime<Utc>,
}

pub fn seismic_recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::None | RiskLevel::Low => "Continue routine monitoring",
        RiskLevel::Moderate => "Increase monitoring frequency",
        RiskLevel::Elevated => "Enhanced monitoring and public awareness",
        RiskLevel::High | RiskLevel::VeryHigh => "High alert status - prepare emergency response",
        RiskLevel::Critical => "CRITICAL - Activate emergency protocols immediately",
    }
}

pub struct SeismicModel {
    config: SeismicConfig,
    max_match_distance_km: f64,
    samples: SeismicSamples,
}

impl SeismicModel {
    pub fn new(config: SeismicConfig, max_match_distance_km: f64) -> HazardResult<Self> {
        Ok(Self {
            config,
            max_match_distance_km,
            samples: SeismicSamples::new()?,
        })
    }
}

impl HazardModel for SeismicModel {
    type Output = SeismicPrediction;

    fn kind(&self) -> HazardKind {
        HazardKind::Seismic
    }

    fn config(&self) -> &ModelConfig {
        &self.config.model
    }

    fn samples(&self) -> &dyn SampleSource {
        &self.samples
    }

    fn assemble(&self, scored: &Scored<'_>) -> HazardResult<SeismicPrediction> {
        let table = &self.config.model.risk_levels;
        let vector = scored.vector;
        let location = scored.input.location;

        let expected = expected_magnitude(vector.value(idx::DEPTH_KM), vector.value(idx::CRUSTAL_STRAIN))?;
        let risk_level = table.classify(scored.score);

        Ok(SeismicPrediction {
            location,
            risk_score: scored.score,
            risk_level,
            confidence: table.confidence(scored.score),
            expected_magnitude: expected,
            magnitude_range: magnitude_range(expected),
            probability_m5_plus: probability_above_m5(scored.score),
            probability_m7_plus: probability_above_m7(scored.score),
            tectonic_zone: scored
                .zones
                .nearest(ZoneCategory::Tectonic, &location, self.max_match_distance_km),
            recommendation: seismic_recommendation(risk_level).to_string(),
            features: vector.named_values(),
            predicted_at: Utc::now(),
        })
    }
}
