//! Seismic → tsunami cascade
//!
//! A major seismic score at a coastal point replaces the caller's
//! magnitude with the seismic model's expected magnitude.

use serde::{Deserialize, Serialize};

use crate::logic::config::CascadeConfig;
use crate::logic::hazard::{MagnitudeSource, PredictionInput, SeismicPrediction};
use crate::logic::zones::ZoneRegistry;

pub(super) const MAGNITUDE_FEATURE: &str = "earthquake_magnitude";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeDecision {
    pub triggered: bool,
    pub seismic_risk: f64,
    pub major_threshold: f64,
    pub coastal: bool,
    pub caller_magnitude: Option<f64>,
    /// Set only when triggered
    pub cascade_magnitude: Option<f64>,
    pub reason: String,
}

impl CascadeDecision {
    pub fn evaluate(
        config: &CascadeConfig,
        zones: &ZoneRegistry,
        seismic: &SeismicPrediction,
        caller_magnitude: Option<f64>,
    ) -> Self {
        let coastal = zones.is_coastal(&seismic.location, config.coastal_distance_km);
        let major = seismic.risk_score >= config.major_threshold;
        let triggered = config.enabled && major && coastal;

        let reason = if !config.enabled {
            "cascade disabled".to_string()
        } else if !major {
            format!(
                "seismic risk {:.3} below major threshold {:.2}",
                seismic.risk_score, config.major_threshold
            )
        } else if !coastal {
            format!("no coastline within {:.0} km", config.coastal_distance_km)
        } else {
            format!(
                "seismic risk {:.3} >= {:.2} at a coastal point; using expected magnitude {:.2}",
                seismic.risk_score, config.major_threshold, seismic.expected_magnitude
            )
        };

        Self {
            triggered,
            seismic_risk: seismic.risk_score,
            major_threshold: config.major_threshold,
            coastal,
            caller_magnitude,
            cascade_magnitude: triggered.then_some(seismic.expected_magnitude),
            reason,
        }
    }

    /// Tsunami input with the magnitude this decision settles on
    pub fn apply(&self, mut input: PredictionInput) -> PredictionInput {
        match self.cascade_magnitude {
            Some(magnitude) => {
                if let Some(caller) = self.caller_magnitude {
                    log::info!(
                        "Cascade overrides caller magnitude {:.2} with seismic estimate {:.2}",
                        caller,
                        magnitude
                    );
                }
                input.overrides.insert(MAGNITUDE_FEATURE.to_string(), magnitude);
                input.magnitude_source = MagnitudeSource::SeismicCascade;
            }
            None => {
                if let Some(caller) = self.caller_magnitude {
                    input.overrides.insert(MAGNITUDE_FEATURE.to_string(), caller);
                }
                input.magnitude_source = MagnitudeSource::Caller;
            }
        }
        input
    }
}
