//! Multi-hazard assessment: all three predictors, cascade, summary, alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cascade::{CascadeDecision, MAGNITUDE_FEATURE};
use super::DisasterEngine;
use crate::logic::alerts::{self, EmergencyAlert};
use crate::logic::derived::runoff::LandCover;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::{reject_location_overrides, FeatureOverrides, HazardKind};
use crate::logic::geo::GeoPoint;
use crate::logic::hazard::{FloodPrediction, PredictionInput, SeismicPrediction, TsunamiPrediction};
use crate::logic::model::RiskLevel;
use crate::logic::zones::ZoneCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub location: GeoPoint,
    #[serde(default)]
    pub rainfall_mm: Option<f64>,
    /// Caller magnitude; the cascade may replace it
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub soil_type: Option<LandCover>,
    /// Named features for any hazard; each goes to the layouts that know it
    #[serde(default)]
    pub overrides: FeatureOverrides,
}

impl AssessmentRequest {
    pub fn new(location: GeoPoint) -> Self {
        Self {
            location,
            rainfall_mm: None,
            magnitude: None,
            soil_type: None,
            overrides: FeatureOverrides::new(),
        }
    }

    pub fn rainfall(mut self, rainfall_mm: f64) -> Self {
        self.rainfall_mm = Some(rainfall_mm);
        self
    }

    pub fn magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub location_name: String,
    pub overall_risk_level: RiskLevel,
    pub primary_threat: HazardKind,
    /// Other hazards at MODERATE or above, most severe first
    pub secondary_threats: Vec<HazardKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub location: GeoPoint,
    pub seismic: SeismicPrediction,
    pub flood: FloodPrediction,
    pub tsunami: TsunamiPrediction,
    pub cascade: CascadeDecision,
    pub summary: AssessmentSummary,
    pub alerts: Vec<EmergencyAlert>,
    pub assessed_at: DateTime<Utc>,
}

impl Assessment {
    pub fn level(&self, hazard: HazardKind) -> RiskLevel {
        match hazard {
            HazardKind::Seismic => self.seismic.risk_level,
            HazardKind::Flood => self.flood.risk_level,
            HazardKind::Tsunami => self.tsunami.risk_level,
        }
    }

    pub fn score(&self, hazard: HazardKind) -> f64 {
        match hazard {
            HazardKind::Seismic => self.seismic.risk_score,
            HazardKind::Flood => self.flood.risk_score,
            HazardKind::Tsunami => self.tsunami.risk_score,
        }
    }
}

/// Route shared overrides to each hazard; names no layout knows are rejected
fn split_overrides(overrides: &FeatureOverrides) -> HazardResult<[FeatureOverrides; 3]> {
    reject_location_overrides(overrides)?;
    let mut split: [FeatureOverrides; 3] = Default::default();
    for (name, value) in overrides {
        let mut known = false;
        for (slot, hazard) in split.iter_mut().zip(HazardKind::ALL) {
            if hazard.layout().index_of(name).is_some() {
                slot.insert(name.clone(), *value);
                known = true;
            }
        }
        if !known {
            return Err(HazardError::invalid(format!("unknown feature '{}'", name)));
        }
    }
    Ok(split)
}

fn location_name(engine: &DisasterEngine, location: &GeoPoint) -> String {
    [ZoneCategory::Tectonic, ZoneCategory::FloodBasin, ZoneCategory::Coastline]
        .into_iter()
        .find_map(|category| engine.zones().containing(category, location))
        .map(|zone| zone.label())
        .unwrap_or_else(|| location.label())
}

fn summarize(location_name: String, levels: [(HazardKind, RiskLevel, f64); 3]) -> AssessmentSummary {
    let mut ranked = levels.to_vec();
    // most severe first, score breaks ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.total_cmp(&a.2)));

    let (primary_threat, overall_risk_level, _) = ranked[0];
    let secondary_threats = ranked[1..]
        .iter()
        .filter(|(_, level, _)| level.is_at_least(RiskLevel::Moderate))
        .map(|(hazard, _, _)| *hazard)
        .collect();

    AssessmentSummary {
        location_name,
        overall_risk_level,
        primary_threat,
        secondary_threats,
    }
}

impl DisasterEngine {
    pub fn assess(&self, request: &AssessmentRequest) -> HazardResult<Assessment> {
        request.location.validate()?;
        let [seismic_overrides, mut flood_overrides, mut tsunami_overrides] = split_overrides(&request.overrides)?;

        if let Some(rain) = request.rainfall_mm {
            flood_overrides.insert("rainfall_mm".to_string(), rain);
        }
        let caller_magnitude = request
            .magnitude
            .or_else(|| tsunami_overrides.remove(MAGNITUDE_FEATURE));

        let seismic = self
            .seismic
            .predict(&PredictionInput::new(request.location).with_overrides(&seismic_overrides))?;

        let mut flood_input = PredictionInput::new(request.location).with_overrides(&flood_overrides);
        flood_input.soil_type = request.soil_type;
        let flood = self.flood.predict(&flood_input)?;

        let cascade = CascadeDecision::evaluate(&self.config.cascade, &self.zones, &seismic, caller_magnitude);
        let tsunami_input = cascade.apply(PredictionInput::new(request.location).with_overrides(&tsunami_overrides));
        let tsunami = self.tsunami.predict(&tsunami_input)?;

        let summary = summarize(
            location_name(self, &request.location),
            [
                (HazardKind::Seismic, seismic.risk_level, seismic.risk_score),
                (HazardKind::Flood, flood.risk_level, flood.risk_score),
                (HazardKind::Tsunami, tsunami.risk_level, tsunami.risk_score),
            ],
        );
        let alerts = alerts::evaluate(&self.config.alerts, &seismic, &flood, &tsunami);

        log::info!(
            "Assessment for {}: overall {} (primary {}), cascade {}",
            summary.location_name,
            summary.overall_risk_level,
            summary.primary_threat.display_name(),
            if cascade.triggered { "triggered" } else { "not triggered" }
        );

        Ok(Assessment {
            location: request.location,
            seismic,
            flood,
            tsunami,
            cascade,
            summary,
            alerts,
            assessed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_overrides_routes_by_layout() {
        let mut overrides = FeatureOverrides::new();
        overrides.insert("depth_km".to_string(), 25.0);
        overrides.insert("rainfall_mm".to_string(), 80.0);
        overrides.insert("coast_slope".to_string(), 0.1);
        overrides.insert("ocean_depth_m".to_string(), 3000.0);

        let [seismic, flood, tsunami] = split_overrides(&overrides).unwrap();
        assert_eq!(seismic.len(), 1);
        assert_eq!(flood.len(), 1);
        assert_eq!(tsunami.len(), 2);
    }

    #[test]
    fn test_split_overrides_rejects_location() {
        let mut overrides = FeatureOverrides::new();
        overrides.insert("latitude".to_string(), -40.0);
        let err = split_overrides(&overrides).unwrap_err();
        assert!(matches!(err, HazardError::InvalidInput(ref msg) if msg.contains("latitude")));
    }

    #[test]
    fn test_split_overrides_rejects_unknown() {
        let mut overrides = FeatureOverrides::new();
        overrides.insert("wind_speed".to_string(), 10.0);
        assert!(matches!(split_overrides(&overrides), Err(HazardError::InvalidInput(_))));
    }

    #[test]
    fn test_summary_ranks_by_level_then_score() {
        let summary = summarize(
            "Japan".to_string(),
            [
                (HazardKind::Seismic, RiskLevel::High, 0.72),
                (HazardKind::Flood, RiskLevel::Moderate, 0.44),
                (HazardKind::Tsunami, RiskLevel::High, 0.76),
            ],
        );
        assert_eq!(summary.primary_threat, HazardKind::Tsunami);
        assert_eq!(summary.overall_risk_level, RiskLevel::High);
        assert_eq!(summary.secondary_threats, vec![HazardKind::Seismic, HazardKind::Flood]);
    }

    #[test]
    fn test_summary_skips_low_secondaries() {
        let summary = summarize(
            "x".to_string(),
            [
                (HazardKind::Seismic, RiskLevel::Low, 0.1),
                (HazardKind::Flood, RiskLevel::None, 0.05),
                (HazardKind::Tsunami, RiskLevel::Moderate, 0.5),
            ],
        );
        assert_eq!(summary.primary_threat, HazardKind::Tsunami);
        assert!(summary.secondary_threats.is_empty());
    }
}
