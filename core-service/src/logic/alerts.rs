//! Emergency alerts raised from a multi-hazard assessment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::config::AlertConfig;
use crate::logic::features::HazardKind;
use crate::logic::geo::GeoPoint;
use crate::logic::hazard::{FloodPrediction, SeismicPrediction, TsunamiPrediction};
use crate::logic::model::{RiskLevel, ThreatLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Warning,  // configured threshold crossed
    Critical, // top level of the hazard's own scale
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyAlert {
    pub hazard: HazardKind,
    pub severity: AlertSeverity,
    pub location: GeoPoint,
    /// The prediction's recommendation
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

impl EmergencyAlert {
    fn new(hazard: HazardKind, severity: AlertSeverity, location: GeoPoint, message: &str) -> Self {
        Self {
            hazard,
            severity,
            location,
            message: message.to_string(),
            issued_at: Utc::now(),
        }
    }

    pub fn headline(&self) -> String {
        format!(
            "[{}] {:?}: {}",
            self.hazard.display_name().to_uppercase(),
            self.severity,
            self.message
        )
    }
}

fn score_severity(level: RiskLevel, score: f64, threshold: f64) -> Option<AlertSeverity> {
    if level == RiskLevel::Critical {
        Some(AlertSeverity::Critical)
    } else if score >= threshold {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

fn tsunami_severity(config: &AlertConfig, prediction: &TsunamiPrediction) -> Option<AlertSeverity> {
    if prediction.threat_level == ThreatLevel::MajorWarning {
        Some(AlertSeverity::Critical)
    } else if prediction.wave_height_m >= config.tsunami_wave_height_m
        && prediction.travel_time_hours <= config.tsunami_travel_time_hours
    {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

/// Alerts for every hazard at its critical level or past its configured threshold
pub fn evaluate(
    config: &AlertConfig,
    seismic: &SeismicPrediction,
    flood: &FloodPrediction,
    tsunami: &TsunamiPrediction,
) -> Vec<EmergencyAlert> {
    let mut alerts = Vec::new();

    if let Some(severity) = score_severity(seismic.risk_level, seismic.risk_score, config.earthquake_risk) {
        alerts.push(EmergencyAlert::new(
            HazardKind::Seismic,
            severity,
            seismic.location,
            &seismic.recommendation,
        ));
    }
    if let Some(severity) = score_severity(flood.risk_level, flood.risk_score, config.flood_risk) {
        alerts.push(EmergencyAlert::new(
            HazardKind::Flood,
            severity,
            flood.location,
            &flood.recommendation,
        ));
    }
    if let Some(severity) = tsunami_severity(config, tsunami) {
        alerts.push(EmergencyAlert::new(
            HazardKind::Tsunami,
            severity,
            tsunami.location,
            &tsunami.recommendation,
        ));
    }

    if !alerts.is_empty() {
        log::warn!(
            "EMERGENCY ALERT: {} hazard(s) at {}",
            alerts.len(),
            seismic.location.label()
        );
        for alert in &alerts {
            log::warn!("{}", alert.headline());
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_severity() {
        assert_eq!(score_severity(RiskLevel::Critical, 0.5, 0.8), Some(AlertSeverity::Critical));
        assert_eq!(score_severity(RiskLevel::High, 0.85, 0.8), Some(AlertSeverity::Warning));
        assert_eq!(score_severity(RiskLevel::High, 0.7, 0.8), None);
    }

    #[test]
    fn test_headline() {
        let alert = EmergencyAlert::new(
            HazardKind::Tsunami,
            AlertSeverity::Critical,
            GeoPoint::new(35.0, 140.0).unwrap(),
            "Evacuate",
        );
        assert_eq!(alert.headline(), "[TSUNAMI] Critical: Evacuate");
    }
}
