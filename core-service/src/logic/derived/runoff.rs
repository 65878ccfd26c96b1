//! Flood hydrology: SCS curve-number runoff and terrain heuristics

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::clip01;
use crate::logic::error::{require_non_negative, HazardError, HazardResult};

/// Urbanization at or above this counts as urban land cover
pub const URBAN_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandCover {
    Sand,
    #[default]
    Loam,
    Clay,
    Urban,
}

impl LandCover {
    pub fn curve_number(&self) -> f64 {
        match self {
            LandCover::Sand => 50.0,
            LandCover::Loam => 75.0,
            LandCover::Clay => 85.0,
            LandCover::Urban => 90.0,
        }
    }

    /// Urban cover wins over soil type once urbanization is high enough
    pub fn resolve(soil: LandCover, urbanization: f64) -> LandCover {
        if urbanization >= URBAN_THRESHOLD {
            LandCover::Urban
        } else {
            soil
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LandCover::Sand => "sand",
            LandCover::Loam => "loam",
            LandCover::Clay => "clay",
            LandCover::Urban => "urban",
        }
    }
}

impl fmt::Display for LandCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LandCover {
    type Err = HazardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sand" | "sandy" => Ok(LandCover::Sand),
            "loam" => Ok(LandCover::Loam),
            "clay" => Ok(LandCover::Clay),
            "urban" => Ok(LandCover::Urban),
            other => Err(HazardError::invalid(format!("unknown soil type '{}'", other))),
        }
    }
}

/// S = 25400/CN − 254 (mm)
pub fn potential_retention_mm(curve_number: f64) -> HazardResult<f64> {
    if !(curve_number > 0.0 && curve_number <= 100.0) {
        return Err(HazardError::invalid(format!(
            "curve number {} outside (0, 100]",
            curve_number
        )));
    }
    Ok(25400.0 / curve_number - 254.0)
}

/// SCS runoff (mm); zero until rainfall exceeds the initial abstraction 0.2·S
pub fn scs_runoff_mm(rainfall_mm: f64, curve_number: f64) -> HazardResult<f64> {
    let p = require_non_negative("rainfall_mm", rainfall_mm)?;
    let s = potential_retention_mm(curve_number)?;
    let initial_abstraction = 0.2 * s;

    if p <= initial_abstraction {
        return Ok(0.0);
    }
    Ok((p - initial_abstraction).powi(2) / (p + 0.8 * s))
}

fn terrain_factors(elevation_m: f64, slope_degrees: f64) -> (f64, f64) {
    (
        1.0 - clip01(elevation_m / 2000.0),
        1.0 - clip01(slope_degrees / 30.0),
    )
}

/// Standing water estimate from rainfall excess over soil absorption
pub fn water_depth_m(
    rainfall_mm: f64,
    soil_moisture: f64,
    elevation_m: f64,
    slope_degrees: f64,
) -> HazardResult<f64> {
    let p = require_non_negative("rainfall_mm", rainfall_mm)?;
    let slope = require_non_negative("slope_degrees", slope_degrees)?;
    let (elevation_factor, slope_factor) = terrain_factors(elevation_m, slope);

    let absorption = (1.0 - clip01(soil_moisture)) * 10.0;
    let excess = (p - absorption).max(0.0);
    Ok(excess * elevation_factor * slope_factor / 10.0)
}

/// km², proportional to risk and damped by high or steep terrain
pub fn affected_area_km2(risk_score: f64, elevation_m: f64, slope_degrees: f64) -> HazardResult<f64> {
    let slope = require_non_negative("slope_degrees", slope_degrees)?;
    let (elevation_factor, slope_factor) = terrain_factors(elevation_m, slope);
    Ok(100.0 * clip01(risk_score) * elevation_factor * slope_factor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainExposure {
    High,
    Moderate,
    Low,
}

pub fn terrain_exposure(elevation_m: f64) -> TerrainExposure {
    if elevation_m < 500.0 {
        TerrainExposure::High
    } else if elevation_m < 1000.0 {
        TerrainExposure::Moderate
    } else {
        TerrainExposure::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_numbers() {
        assert_eq!(LandCover::Sand.curve_number(), 50.0);
        assert_eq!(LandCover::Urban.curve_number(), 90.0);
        assert_eq!(LandCover::resolve(LandCover::Clay, 0.7), LandCover::Urban);
        assert_eq!(LandCover::resolve(LandCover::Clay, 0.59), LandCover::Clay);
        assert_eq!("Sandy".parse::<LandCover>().unwrap(), LandCover::Sand);
    }

    #[test]
    fn test_retention_loam() {
        let s = potential_retention_mm(75.0).unwrap();
        assert!((s - 84.6667).abs() < 1e-3);
        assert!(potential_retention_mm(0.0).is_err());
        assert!(potential_retention_mm(120.0).is_err());
    }

    #[test]
    fn test_runoff_zero_below_initial_abstraction() {
        for cn in [50.0, 75.0, 85.0, 90.0] {
            let s = potential_retention_mm(cn).unwrap();
            let mut p = 0.0;
            while p <= 0.2 * s {
                assert_eq!(scs_runoff_mm(p, cn).unwrap(), 0.0, "cn {} p {}", cn, p);
                p += 0.5;
            }
        }
    }

    #[test]
    fn test_runoff_strictly_increasing_above_abstraction() {
        for cn in [50.0, 75.0, 85.0, 90.0] {
            let s = potential_retention_mm(cn).unwrap();
            let mut previous = 0.0;
            let mut p = 0.2 * s + 0.5;
            while p < 500.0 {
                let runoff = scs_runoff_mm(p, cn).unwrap();
                assert!(runoff > previous, "cn {} p {}", cn, p);
                previous = runoff;
                p += 5.0;
            }
        }
    }

    #[test]
    fn test_runoff_known_value() {
        // loam, 75 mm: S = 84.67, Ia = 16.93 → Q ≈ 23.6 mm
        let q = scs_runoff_mm(75.0, 75.0).unwrap();
        assert!((q - 23.62).abs() < 0.05, "got {}", q);
    }

    #[test]
    fn test_negative_rainfall_rejected() {
        assert!(matches!(scs_runoff_mm(-1.0, 75.0), Err(HazardError::InvalidInput(_))));
        assert!(water_depth_m(-5.0, 0.4, 100.0, 2.0).is_err());
        assert!(affected_area_km2(0.5, 100.0, -2.0).is_err());
    }

    #[test]
    fn test_water_depth() {
        // excess 69 mm, factors 0.75 · (1 − 8/30)
        let depth = water_depth_m(75.0, 0.4, 500.0, 8.0).unwrap();
        assert!((depth - 69.0 * 0.75 * (22.0 / 30.0) / 10.0).abs() < 1e-9);
        assert_eq!(water_depth_m(5.0, 0.0, 0.0, 0.0).unwrap(), 0.0);
        // high mountains shed everything
        assert_eq!(water_depth_m(300.0, 0.9, 2500.0, 5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_affected_area_and_exposure() {
        assert!((affected_area_km2(0.5, 0.0, 0.0).unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(affected_area_km2(0.5, 0.0, 45.0).unwrap(), 0.0);
        assert_eq!(terrain_exposure(10.0), TerrainExposure::High);
        assert_eq!(terrain_exposure(700.0), TerrainExposure::Moderate);
        assert_eq!(terrain_exposure(1500.0), TerrainExposure::Low);
    }
}
