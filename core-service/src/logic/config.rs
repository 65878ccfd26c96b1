//! Engine configuration
//!
//! Threshold tables and model hyper-parameters are data, loaded from JSON.
//! Every section has documented defaults so a partial file is enough.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::{HazardError, HazardResult};
use super::model::threshold::{RiskLevel, ThreatLevel, ThresholdTable, WarningLevel};
use crate::constants;

// ============================================================================
// ENSEMBLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnsembleConfig {
    /// Sequential residual fitting from the target mean
    GradientBoosting {
        n_estimators: usize,
        max_depth: usize,
        learning_rate: f64,
        #[serde(default = "default_min_samples_leaf")]
        min_samples_leaf: usize,
    },
    /// Bootstrap-bagged trees, averaged
    RandomForest {
        n_estimators: usize,
        max_depth: usize,
        #[serde(default = "default_min_samples_leaf")]
        min_samples_leaf: usize,
        /// Features tried per split; `None` = all
        #[serde(default)]
        max_features: Option<usize>,
    },
}

fn default_min_samples_leaf() -> usize {
    1
}

impl EnsembleConfig {
    pub fn gradient_boosting(n_estimators: usize, max_depth: usize, learning_rate: f64) -> Self {
        EnsembleConfig::GradientBoosting {
            n_estimators,
            max_depth,
            learning_rate,
            min_samples_leaf: default_min_samples_leaf(),
        }
    }

    pub fn random_forest(n_estimators: usize, max_depth: usize) -> Self {
        EnsembleConfig::RandomForest {
            n_estimators,
            max_depth,
            min_samples_leaf: default_min_samples_leaf(),
            max_features: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnsembleConfig::GradientBoosting { .. } => "gradient_boosting",
            EnsembleConfig::RandomForest { .. } => "random_forest",
        }
    }

    pub fn n_estimators(&self) -> usize {
        match self {
            EnsembleConfig::GradientBoosting { n_estimators, .. }
            | EnsembleConfig::RandomForest { n_estimators, .. } => *n_estimators,
        }
    }

    pub fn validate(&self) -> HazardResult<()> {
        let (n_estimators, max_depth, min_samples_leaf) = match self {
            EnsembleConfig::GradientBoosting {
                n_estimators,
                max_depth,
                learning_rate,
                min_samples_leaf,
            } => {
                if !(learning_rate.is_finite() && *learning_rate > 0.0 && *learning_rate <= 1.0) {
                    return Err(HazardError::config(format!(
                        "learning_rate must be in (0, 1], got {}",
                        learning_rate
                    )));
                }
                (*n_estimators, *max_depth, *min_samples_leaf)
            }
            EnsembleConfig::RandomForest {
                n_estimators,
                max_depth,
                min_samples_leaf,
                max_features,
            } => {
                if *max_features == Some(0) {
                    return Err(HazardError::config("max_features must be positive"));
                }
                (*n_estimators, *max_depth, *min_samples_leaf)
            }
        };

        if n_estimators == 0 {
            return Err(HazardError::config("n_estimators must be positive"));
        }
        if max_depth == 0 {
            return Err(HazardError::config("max_depth must be positive"));
        }
        if min_samples_leaf == 0 {
            return Err(HazardError::config("min_samples_leaf must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// PER-HAZARD
// ============================================================================

/// Training + classification settings shared by every hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub training_samples: usize,
    pub ensemble: EnsembleConfig,
    pub risk_levels: ThresholdTable<RiskLevel>,
}

impl ModelConfig {
    pub fn seismic_default() -> Self {
        Self {
            training_samples: constants::DEFAULT_TRAINING_SAMPLES,
            ensemble: EnsembleConfig::gradient_boosting(100, 7, 0.1),
            risk_levels: ThresholdTable::seismic_default(),
        }
    }

    pub fn flood_default() -> Self {
        Self {
            training_samples: constants::DEFAULT_TRAINING_SAMPLES,
            ensemble: EnsembleConfig::gradient_boosting(100, 8, 0.1),
            risk_levels: ThresholdTable::flood_default(),
        }
    }

    pub fn tsunami_default() -> Self {
        Self {
            training_samples: constants::DEFAULT_TRAINING_SAMPLES,
            ensemble: EnsembleConfig::random_forest(100, 10),
            risk_levels: ThresholdTable::tsunami_default(),
        }
    }

    pub fn validate(&self, hazard: &str) -> HazardResult<()> {
        if self.training_samples < 2 {
            return Err(HazardError::config(format!(
                "{}: training_samples must be at least 2, got {}",
                hazard, self.training_samples
            )));
        }
        self.ensemble
            .validate()
            .map_err(|e| e.with_context(hazard))?;
        self.risk_levels
            .validate()
            .map_err(|e| e.with_context(&format!("{} risk levels", hazard)))
    }
}

/// `model` section as written in a file; absent fields keep the
/// hazard's own defaults rather than a shared one
#[derive(Deserialize)]
struct ModelConfigPatch {
    training_samples: Option<usize>,
    ensemble: Option<EnsembleConfig>,
    risk_levels: Option<ThresholdTable<RiskLevel>>,
}

impl ModelConfigPatch {
    fn apply(self, base: ModelConfig) -> ModelConfig {
        ModelConfig {
            training_samples: self.training_samples.unwrap_or(base.training_samples),
            ensemble: self.ensemble.unwrap_or(base.ensemble),
            risk_levels: self.risk_levels.unwrap_or(base.risk_levels),
        }
    }
}

fn seismic_model<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModelConfig, D::Error> {
    ModelConfigPatch::deserialize(deserializer).map(|patch| patch.apply(ModelConfig::seismic_default()))
}

fn flood_model<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModelConfig, D::Error> {
    ModelConfigPatch::deserialize(deserializer).map(|patch| patch.apply(ModelConfig::flood_default()))
}

fn tsunami_model<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModelConfig, D::Error> {
    ModelConfigPatch::deserialize(deserializer).map(|patch| patch.apply(ModelConfig::tsunami_default()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeismicConfig {
    #[serde(deserialize_with = "seismic_model")]
    pub model: ModelConfig,
}

impl Default for SeismicConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::seismic_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    #[serde(deserialize_with = "flood_model")]
    pub model: ModelConfig,
    pub warning_levels: ThresholdTable<WarningLevel>,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::flood_default(),
            warning_levels: ThresholdTable::default(),
        }
    }
}

/// Shallow-water constants used by the derived wave quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsunamiPhysics {
    /// m/s²
    pub gravity: f64,
    /// Run-up = height · shoaling_factor · slope
    pub shoaling_factor: f64,
    /// Subtracted from travel time to get time to escape
    pub evacuation_buffer_minutes: f64,
    pub max_wave_height_m: f64,
}

impl Default for TsunamiPhysics {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            shoaling_factor: 1.5,
            evacuation_buffer_minutes: 30.0,
            max_wave_height_m: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TsunamiConfig {
    #[serde(deserialize_with = "tsunami_model")]
    pub model: ModelConfig,
    pub threat_levels: ThresholdTable<ThreatLevel>,
    pub physics: TsunamiPhysics,
}

impl Default for TsunamiConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::tsunami_default(),
            threat_levels: ThresholdTable::default(),
            physics: TsunamiPhysics::default(),
        }
    }
}

// ============================================================================
// CROSS-HAZARD
// ============================================================================

/// Seismic → tsunami magnitude override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub enabled: bool,
    /// Seismic risk score at or above which the cascade fires
    pub major_threshold: f64,
    /// Coastal if within this distance of a registry coastline
    pub coastal_distance_km: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            major_threshold: 0.6,
            coastal_distance_km: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Nearest-zone lookups beyond this distance return no match
    pub max_match_distance_km: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            max_match_distance_km: 250.0,
        }
    }
}

/// Emergency alert triggers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub earthquake_risk: f64,
    pub flood_risk: f64,
    pub tsunami_wave_height_m: f64,
    /// Alert only when waves arrive sooner than this
    pub tsunami_travel_time_hours: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            earthquake_risk: 0.8,
            flood_risk: 0.8,
            tsunami_wave_height_m: 2.0,
            tsunami_travel_time_hours: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub default_resolution: usize,
    pub max_resolution: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            default_resolution: 10,
            max_resolution: 50,
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `None` draws training randomness from entropy
    pub seed: Option<u64>,
    /// Train on first prediction instead of failing with NotTrained
    pub lazy_training: bool,
    pub seismic: SeismicConfig,
    pub flood: FloodConfig,
    pub tsunami: TsunamiConfig,
    pub cascade: CascadeConfig,
    pub zones: ZoneConfig,
    pub alerts: AlertConfig,
    pub region: RegionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            lazy_training: true,
            seismic: SeismicConfig::default(),
            flood: FloodConfig::default(),
            tsunami: TsunamiConfig::default(),
            cascade: CascadeConfig::default(),
            zones: ZoneConfig::default(),
            alerts: AlertConfig::default(),
            region: RegionConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with a fixed seed (tests, demo)
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Same training size + ensemble size for every hazard
    pub fn with_training_budget(mut self, samples: usize, n_estimators: usize) -> Self {
        for model in [
            &mut self.seismic.model,
            &mut self.flood.model,
            &mut self.tsunami.model,
        ] {
            model.training_samples = samples;
            match &mut model.ensemble {
                EnsembleConfig::GradientBoosting { n_estimators: n, .. }
                | EnsembleConfig::RandomForest { n_estimators: n, .. } => *n = n_estimators,
            }
        }
        self
    }

    pub fn from_json_str(json: &str) -> HazardResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| HazardError::config(format!("invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse + validate a JSON config file
    pub fn load(path: &Path) -> HazardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// `DISPRE_CONFIG` file if set, else defaults; `DISPRE_SEED` overrides the seed
    pub fn from_env() -> HazardResult<Self> {
        let mut config = match constants::get_config_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(seed) = constants::get_seed() {
            config.seed = Some(seed);
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> HazardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> HazardResult<()> {
        self.seismic.model.validate("seismic")?;
        self.flood.model.validate("flood")?;
        self.tsunami.model.validate("tsunami")?;
        self.flood
            .warning_levels
            .validate()
            .map_err(|e| e.with_context("flood warning levels"))?;
        self.tsunami
            .threat_levels
            .validate()
            .map_err(|e| e.with_context("tsunami threat levels"))?;

        let physics = &self.tsunami.physics;
        for (name, value) in [
            ("gravity", physics.gravity),
            ("shoaling_factor", physics.shoaling_factor),
            ("max_wave_height_m", physics.max_wave_height_m),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(HazardError::config(format!("tsunami.physics.{} must be positive", name)));
            }
        }
        if !(physics.evacuation_buffer_minutes.is_finite() && physics.evacuation_buffer_minutes >= 0.0) {
            return Err(HazardError::config("evacuation_buffer_minutes must not be negative"));
        }

        if !(0.0..=1.0).contains(&self.cascade.major_threshold) {
            return Err(HazardError::config(format!(
                "cascade.major_threshold must be in [0, 1], got {}",
                self.cascade.major_threshold
            )));
        }
        if !(self.cascade.coastal_distance_km >= 0.0) {
            return Err(HazardError::config("cascade.coastal_distance_km must not be negative"));
        }
        if !(self.zones.max_match_distance_km >= 0.0) {
            return Err(HazardError::config("zones.max_match_distance_km must not be negative"));
        }
        if self.region.default_resolution < 2 || self.region.default_resolution > self.region.max_resolution {
            return Err(HazardError::config(format!(
                "region.default_resolution must be in [2, {}]",
                self.region.max_resolution
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.lazy_training);
        assert_eq!(config.seed, None);
        assert_eq!(config.seismic.model.ensemble, EnsembleConfig::gradient_boosting(100, 7, 0.1));
        assert_eq!(config.flood.model.ensemble, EnsembleConfig::gradient_boosting(100, 8, 0.1));
        assert_eq!(config.tsunami.model.ensemble, EnsembleConfig::random_forest(100, 10));
        assert_eq!(config.cascade.major_threshold, 0.6);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{"seed": 7, "cascade": {"major_threshold": 0.7}}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cascade.major_threshold, 0.7);
        assert!(config.cascade.enabled);
        assert_eq!(config.tsunami.physics.gravity, 9.81);
    }

    #[test]
    fn test_partial_model_section_keeps_hazard_defaults() {
        let json = r#"{
            "seismic": {"model": {"training_samples": 300}},
            "tsunami": {"model": {"training_samples": 120}}
        }"#;
        let config = EngineConfig::from_json_str(json).unwrap();

        assert_eq!(config.seismic.model.training_samples, 300);
        assert_eq!(config.seismic.model.ensemble, ModelConfig::seismic_default().ensemble);
        assert_eq!(config.seismic.model.risk_levels, ThresholdTable::seismic_default());

        // forest stays a forest
        assert_eq!(config.tsunami.model.training_samples, 120);
        assert_eq!(config.tsunami.model.ensemble, EnsembleConfig::random_forest(100, 10));
        assert_eq!(config.flood.model, ModelConfig::flood_default());
    }

    #[test]
    fn test_ensemble_tagged_json() {
        let json = r#"{"flood": {"model": {
            "training_samples": 300,
            "ensemble": {"kind": "random_forest", "n_estimators": 20, "max_depth": 5},
            "risk_levels": {"min": 0.0, "max": 1.0, "bands": [
                {"level": "LOW", "upper": 0.5}, {"level": "HIGH", "upper": 1.0}
            ]}
        }}}"#;
        let config = EngineConfig::from_json_str(json).unwrap();
        assert_eq!(config.flood.model.ensemble.name(), "random_forest");
        assert_eq!(config.flood.model.training_samples, 300);
    }

    #[test]
    fn test_non_monotonic_table_is_configuration_error() {
        let json = r#"{"seismic": {"model": {
            "training_samples": 100,
            "ensemble": {"kind": "gradient_boosting", "n_estimators": 10, "max_depth": 3, "learning_rate": 0.1},
            "risk_levels": {"min": 0.0, "max": 1.0, "bands": [
                {"level": "LOW", "upper": 0.6}, {"level": "HIGH", "upper": 0.4}, {"level": "CRITICAL", "upper": 1.0}
            ]}
        }}}"#;
        assert!(matches!(
            EngineConfig::from_json_str(json),
            Err(HazardError::Configuration(_))
        ));
    }

    #[test]
    fn test_bad_hyper_parameters_rejected() {
        let mut config = EngineConfig::default();
        config.seismic.model.ensemble = EnsembleConfig::gradient_boosting(0, 7, 0.1);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.flood.model.ensemble = EnsembleConfig::gradient_boosting(10, 7, 1.5);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.cascade.major_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(HazardError::Configuration(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let config = EngineConfig::seeded(42).with_training_budget(200, 30);
        config.save(&path).unwrap();

        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.tsunami.model.ensemble.n_estimators(), 30);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::load(Path::new("/nonexistent/dispre/engine.json"));
        assert!(matches!(result, Err(HazardError::Io(_))));
    }
}
