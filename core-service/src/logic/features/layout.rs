//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema of every hazard**
//!
//! ## Rules:
//! 1. Add feature → increment LAYOUT_VERSION
//! 2. Change order → increment LAYOUT_VERSION
//! 3. Remove feature → increment LAYOUT_VERSION
//!
//! The scaler, the fitted ensemble and every incoming vector carry
//! `(version, hash)`; saved models from another layout refuse to load.

use std::fmt;
use std::str::FromStr;

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::error::{HazardError, HazardResult};

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when any layout below changes
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// HAZARD KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Seismic,
    Flood,
    Tsunami,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [HazardKind::Seismic, HazardKind::Flood, HazardKind::Tsunami];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Seismic => "seismic",
            HazardKind::Flood => "flood",
            HazardKind::Tsunami => "tsunami",
        }
    }

    /// Human-facing name used in summaries and alerts
    pub fn display_name(&self) -> &'static str {
        match self {
            HazardKind::Seismic => "Earthquake",
            HazardKind::Flood => "Flood",
            HazardKind::Tsunami => "Tsunami",
        }
    }

    pub fn layout(&self) -> &'static FeatureLayout {
        match self {
            HazardKind::Seismic => &SEISMIC_LAYOUT,
            HazardKind::Flood => &FLOOD_LAYOUT,
            HazardKind::Tsunami => &TSUNAMI_LAYOUT,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HazardKind {
    type Err = HazardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "seismic" | "earthquake" => Ok(HazardKind::Seismic),
            "flood" => Ok(HazardKind::Flood),
            "tsunami" => Ok(HazardKind::Tsunami),
            other => Err(HazardError::invalid(format!("unknown hazard '{}'", other))),
        }
    }
}

// ============================================================================
// FEATURE SPEC
// ============================================================================

/// One named, bounded input feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    /// `None` = required (caller or prediction location must supply it)
    pub default: Option<f64>,
    pub unit: &'static str,
}

impl FeatureSpec {
    const fn with_default(name: &'static str, min: f64, max: f64, default: f64, unit: &'static str) -> Self {
        Self { name, min, max, default: Some(default), unit }
    }

    const fn required(name: &'static str, min: f64, max: f64, unit: &'static str) -> Self {
        Self { name, min, max, default: None, unit }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    pub fn check(&self, value: f64) -> HazardResult<f64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(HazardError::invalid(format!(
                "{} = {} outside [{}, {}]",
                self.name, value, self.min, self.max
            )))
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

// ============================================================================
// FEATURE LAYOUTS (Authoritative source)
// ============================================================================

/// Ordered feature list for one hazard
#[derive(Debug, PartialEq)]
pub struct FeatureLayout {
    pub hazard: HazardKind,
    pub features: &'static [FeatureSpec],
}

/// Feature indices into `SEISMIC_LAYOUT`
pub mod seismic {
    pub const LATITUDE: usize = 0;
    pub const LONGITUDE: usize = 1;
    pub const DEPTH_KM: usize = 2;
    pub const DAYS_SINCE_LAST_QUAKE: usize = 3;
    pub const CRUSTAL_STRAIN: usize = 4;
    pub const PLATE_MOTION: usize = 5;
    pub const TEMPERATURE: usize = 6;
    pub const PRESSURE: usize = 7;
}

/// Feature indices into `FLOOD_LAYOUT`
pub mod flood {
    pub const RAINFALL_MM: usize = 0;
    pub const SOIL_MOISTURE: usize = 1;
    pub const ELEVATION_M: usize = 2;
    pub const SLOPE_DEGREES: usize = 3;
    pub const RIVER_DISTANCE_KM: usize = 4;
    pub const URBANIZATION: usize = 5;
    pub const DAM_CAPACITY_RATIO: usize = 6;
    pub const ANTECEDENT_MOISTURE: usize = 7;
}

/// Feature indices into `TSUNAMI_LAYOUT`
pub mod tsunami {
    pub const MAGNITUDE: usize = 0;
    pub const EPICENTER_DEPTH_KM: usize = 1;
    pub const DISTANCE_TO_COAST_KM: usize = 2;
    pub const COAST_SLOPE: usize = 3;
    pub const OCEAN_DEPTH_M: usize = 4;
    pub const LATITUDE: usize = 5;
    pub const LONGITUDE: usize = 6;
    pub const WATER_TEMPERATURE: usize = 7;
    pub const SST_ANOMALY: usize = 8;
}

pub static SEISMIC_LAYOUT: FeatureLayout = FeatureLayout {
    hazard: HazardKind::Seismic,
    features: &[
        FeatureSpec::required("latitude", -90.0, 90.0, "deg"),
        FeatureSpec::required("longitude", -180.0, 180.0, "deg"),
        FeatureSpec::with_default("depth_km", 0.0, 700.0, 10.0, "km"),
        FeatureSpec::with_default("days_since_last_quake", 0.0, 36500.0, 30.0, "days"),
        FeatureSpec::with_default("crustal_strain", 0.0, 1.0, 0.5, ""),
        FeatureSpec::with_default("plate_motion_cm_yr", 0.0, 20.0, 5.0, "cm/yr"),
        FeatureSpec::with_default("temperature_c", -90.0, 60.0, 25.0, "°C"),
        FeatureSpec::with_default("pressure_mb", 300.0, 1100.0, 1013.0, "mb"),
    ],
};

/// Filled from the prediction location, never from overrides
pub const LOCATION_FEATURES: [&str; 2] = ["latitude", "longitude"];

pub static FLOOD_LAYOUT: FeatureLayout = FeatureLayout {
    hazard: HazardKind::Flood,
    features: &[
        FeatureSpec::with_default("rainfall_mm", 0.0, 500.0, 50.0, "mm"),
        FeatureSpec::with_default("soil_moisture", 0.0, 1.0, 0.4, ""),
        FeatureSpec::with_default("elevation_m", -500.0, 9000.0, 500.0, "m"),
        FeatureSpec::with_default("slope_degrees", 0.0, 90.0, 8.0, "deg"),
        FeatureSpec::with_default("river_distance_km", 0.0, 1000.0, 20.0, "km"),
        FeatureSpec::with_default("urbanization_factor", 0.0, 1.0, 0.3, ""),
        FeatureSpec::with_default("dam_capacity_ratio", 0.0, 1.0, 0.5, ""),
        FeatureSpec::with_default("antecedent_moisture", 0.0, 1.0, 0.4, ""),
    ],
};

pub static TSUNAMI_LAYOUT: FeatureLayout = FeatureLayout {
    hazard: HazardKind::Tsunami,
    features: &[
        FeatureSpec::with_default("earthquake_magnitude", 0.0, 10.0, 7.0, "Mw"),
        FeatureSpec::with_default("epicenter_depth_km", 0.0, 700.0, 10.0, "km"),
        FeatureSpec::with_default("distance_to_coast_km", 0.0, 20000.0, 50.0, "km"),
        FeatureSpec::with_default("coast_slope", 0.0, 1.0, 0.02, ""),
        FeatureSpec::with_default("ocean_depth_m", 1.0, 11000.0, 2000.0, "m"),
        FeatureSpec::required("latitude", -90.0, 90.0, "deg"),
        FeatureSpec::required("longitude", -180.0, 180.0, "deg"),
        FeatureSpec::with_default("water_temperature_c", -5.0, 40.0, 15.0, "°C"),
        FeatureSpec::with_default("sst_anomaly", -10.0, 10.0, 0.0, "°C"),
    ],
};

impl FeatureLayout {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name).collect()
    }

    /// Get feature index by name (O(n) but features are few)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f.name == name)
    }

    pub fn spec(&self, index: usize) -> Option<&'static FeatureSpec> {
        self.features.get(index)
    }

    /// Indices of (latitude, longitude) when the layout carries a location
    pub fn location_indices(&self) -> Option<(usize, usize)> {
        let [lat, lon] = LOCATION_FEATURES;
        Some((self.index_of(lat)?, self.index_of(lon)?))
    }

    /// CRC32 over hazard, version and ordered names
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(self.hazard.as_str().as_bytes());
        hasher.update(&[LAYOUT_VERSION]);
        for spec in self.features {
            hasher.update(spec.name.as_bytes());
            hasher.update(&[0]); // separator
        }
        hasher.finalize()
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            hazard: self.hazard,
            version: LAYOUT_VERSION,
            hash: self.hash(),
            feature_count: self.len(),
            feature_names: self.names().into_iter().map(String::from).collect(),
        }
    }

    /// Validate that incoming (version, hash) matches this layout
    pub fn validate(&self, version: u8, hash: u32) -> HazardResult<()> {
        let expected = self.hash();
        if version != LAYOUT_VERSION || hash != expected {
            return Err(HazardError::LayoutMismatch {
                hazard: self.hazard.to_string(),
                expected_version: LAYOUT_VERSION,
                expected_hash: expected,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    pub fn is_compatible(&self, version: u8, hash: u32) -> bool {
        self.validate(version, hash).is_ok()
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Serializable layout identity, stored next to scalers and models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub hazard: HazardKind,
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    /// Check this stored identity against the current layout of its hazard
    pub fn validate_current(&self) -> HazardResult<()> {
        self.hazard.layout().validate(self.version, self.hash)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_counts() {
        assert_eq!(SEISMIC_LAYOUT.len(), 8);
        assert_eq!(FLOOD_LAYOUT.len(), 8);
        assert_eq!(TSUNAMI_LAYOUT.len(), 9);
    }

    #[test]
    fn test_index_constants_match_names() {
        assert_eq!(SEISMIC_LAYOUT.index_of("depth_km"), Some(seismic::DEPTH_KM));
        assert_eq!(SEISMIC_LAYOUT.index_of("pressure_mb"), Some(seismic::PRESSURE));
        assert_eq!(FLOOD_LAYOUT.index_of("rainfall_mm"), Some(flood::RAINFALL_MM));
        assert_eq!(FLOOD_LAYOUT.index_of("antecedent_moisture"), Some(flood::ANTECEDENT_MOISTURE));
        assert_eq!(TSUNAMI_LAYOUT.index_of("ocean_depth_m"), Some(tsunami::OCEAN_DEPTH_M));
        assert_eq!(TSUNAMI_LAYOUT.index_of("sst_anomaly"), Some(tsunami::SST_ANOMALY));
        assert_eq!(TSUNAMI_LAYOUT.location_indices(), Some((tsunami::LATITUDE, tsunami::LONGITUDE)));
        assert_eq!(FLOOD_LAYOUT.location_indices(), None);
    }

    #[test]
    fn test_defaults_inside_ranges() {
        for kind in HazardKind::ALL {
            for spec in kind.layout().features {
                if let Some(default) = spec.default {
                    assert!(spec.contains(default), "{} default out of range", spec.name);
                }
            }
        }
    }

    #[test]
    fn test_layout_hashes_differ_per_hazard() {
        let seismic = SEISMIC_LAYOUT.hash();
        assert_eq!(seismic, SEISMIC_LAYOUT.hash());
        assert_ne!(seismic, FLOOD_LAYOUT.hash());
        assert_ne!(FLOOD_LAYOUT.hash(), TSUNAMI_LAYOUT.hash());
    }

    #[test]
    fn test_validate_layout() {
        let hash = FLOOD_LAYOUT.hash();
        assert!(FLOOD_LAYOUT.validate(LAYOUT_VERSION, hash).is_ok());
        assert!(matches!(
            FLOOD_LAYOUT.validate(LAYOUT_VERSION + 1, hash),
            Err(HazardError::LayoutMismatch { .. })
        ));
        assert!(!FLOOD_LAYOUT.is_compatible(LAYOUT_VERSION, hash.wrapping_add(1)));
    }

    #[test]
    fn test_hazard_kind_parse() {
        assert_eq!("earthquake".parse::<HazardKind>().unwrap(), HazardKind::Seismic);
        assert_eq!("Tsunami".parse::<HazardKind>().unwrap(), HazardKind::Tsunami);
        assert!("volcano".parse::<HazardKind>().is_err());
    }
}
