use serde::{Deserialize, Serialize};

use super::DisasterEngine;
use crate::constants;
use crate::logic::config::CascadeConfig;
use crate::logic::features::LayoutInfo;
use crate::logic::hazard::PredictorStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub version: String,
    pub seed: Option<u64>,
    pub zones: usize,
    pub all_trained: bool,
    pub models: Vec<PredictorStatus>,
    pub layouts: Vec<LayoutInfo>,
    pub cascade: CascadeConfig,
}

impl DisasterEngine {
    pub fn status(&self) -> EngineStatus {
        let models = vec![self.seismic.status(), self.flood.status(), self.tsunami.status()];
        EngineStatus {
            version: constants::APP_VERSION.to_string(),
            seed: self.config.seed,
            zones: self.zones.len(),
            all_trained: models.iter().all(|m| m.trained),
            layouts: models.iter().map(|m| m.hazard.layout().info()).collect(),
            models,
            cascade: self.config.cascade.clone(),
        }
    }
}
