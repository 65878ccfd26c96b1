//! Threshold tables - continuous score → ordered qualitative level
//!
//! A table is an ascending list of inclusive upper bounds over `[min, max]`.
//! Scores are clamped into the domain before the scan, so slight ensemble
//! overshoot never fails classification.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::logic::error::{HazardError, HazardResult};

// ============================================================================
// LEVELS
// ============================================================================

/// Anything a threshold table can emit
pub trait Level: Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;
}

/// Shared risk scale; each hazard's table uses a subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    None,
    Low,
    Moderate,
    Elevated,
    High,
    VeryHigh,
    Critical,
}

impl RiskLevel {
    pub fn severity(&self) -> u8 {
        *self as u8
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::None => "#10b981",
            RiskLevel::Low => "#84cc16",
            RiskLevel::Moderate => "#f59e0b",
            RiskLevel::Elevated => "#f97316",
            RiskLevel::High => "#ef4444",
            RiskLevel::VeryHigh => "#dc2626",
            RiskLevel::Critical => "#7f1d1d",
        }
    }

    pub fn is_at_least(&self, other: RiskLevel) -> bool {
        *self >= other
    }
}

impl Level for RiskLevel {
    fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "NONE",
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::Elevated => "ELEVATED",
            RiskLevel::High => "HIGH",
            RiskLevel::VeryHigh => "VERY_HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// Flood color-coded warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevel {
    Green,
    Yellow,
    Orange,
    Red,
}

impl Level for WarningLevel {
    fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Green => "GREEN",
            WarningLevel::Yellow => "YELLOW",
            WarningLevel::Orange => "ORANGE",
            WarningLevel::Red => "RED",
        }
    }
}

/// Tsunami threat keyed on wave height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatLevel {
    Advisory,
    Watch,
    Warning,
    MajorWarning,
}

impl Level for ThreatLevel {
    fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Advisory => "ADVISORY",
            ThreatLevel::Watch => "WATCH",
            ThreatLevel::Warning => "WARNING",
            ThreatLevel::MajorWarning => "MAJOR_WARNING",
        }
    }
}

macro_rules! impl_level_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        })*
    };
}

impl_level_display!(RiskLevel, WarningLevel, ThreatLevel);

// ============================================================================
// THRESHOLD TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "L: Level")]
pub struct ThresholdBand<L> {
    pub level: L,
    /// Inclusive upper bound
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "L: Level")]
pub struct ThresholdTable<L> {
    pub min: f64,
    pub max: f64,
    pub bands: Vec<ThresholdBand<L>>,
}

impl<L: Level> ThresholdTable<L> {
    /// Build and validate from `(level, upper)` pairs; `max` is the last bound
    pub fn new(min: f64, bands: &[(L, f64)]) -> HazardResult<Self> {
        let table = Self {
            min,
            max: bands.last().map(|(_, upper)| *upper).unwrap_or(min),
            bands: bands
                .iter()
                .map(|&(level, upper)| ThresholdBand { level, upper })
                .collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Bounds strictly increasing from `min`, last bound == `max`
    pub fn validate(&self) -> HazardResult<()> {
        if self.bands.is_empty() {
            return Err(HazardError::config("threshold table has no bands"));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(HazardError::config(format!(
                "threshold domain [{}, {}] is not a finite ascending range",
                self.min, self.max
            )));
        }

        let mut previous = self.min;
        for band in &self.bands {
            if !band.upper.is_finite() || band.upper <= previous {
                return Err(HazardError::config(format!(
                    "threshold for {} ({}) must be greater than {}",
                    band.level.as_str(),
                    band.upper,
                    previous
                )));
            }
            previous = band.upper;
        }

        if (previous - self.max).abs() > f64::EPSILON {
            return Err(HazardError::config(format!(
                "last threshold {} must equal the domain maximum {}",
                previous, self.max
            )));
        }

        for (i, band) in self.bands.iter().enumerate() {
            if self.bands[..i].iter().any(|b| b.level == band.level) {
                return Err(HazardError::config(format!(
                    "level {} appears twice in threshold table",
                    band.level.as_str()
                )));
            }
        }

        Ok(())
    }

    pub fn clamp(&self, score: f64) -> f64 {
        if score.is_nan() {
            return self.min;
        }
        score.clamp(self.min, self.max)
    }

    fn band_index(&self, score: f64) -> usize {
        let score = self.clamp(score);
        self.bands
            .iter()
            .position(|b| score <= b.upper)
            .unwrap_or(self.bands.len() - 1)
    }

    /// First level whose upper bound is ≥ the clamped score
    pub fn classify(&self, score: f64) -> L {
        self.bands[self.band_index(score)].level
    }

    /// `(lower, upper)` of a level's band
    pub fn band_range(&self, level: L) -> Option<(f64, f64)> {
        let index = self.bands.iter().position(|b| b.level == level)?;
        Some(self.range_at(index))
    }

    fn range_at(&self, index: usize) -> (f64, f64) {
        let lower = if index == 0 { self.min } else { self.bands[index - 1].upper };
        (lower, self.bands[index].upper)
    }

    /// 0.5 on a boundary between two levels, 1.0 at least half a band away
    pub fn confidence(&self, score: f64) -> f64 {
        let score = self.clamp(score);
        let index = self.band_index(score);
        let (lower, upper) = self.range_at(index);

        // Domain edges are not decision boundaries.
        let mut distance = f64::INFINITY;
        if index > 0 {
            distance = distance.min(score - lower);
        }
        if index + 1 < self.bands.len() {
            distance = distance.min(upper - score);
        }
        if distance.is_infinite() {
            return 1.0;
        }

        let half_width = (upper - lower) / 2.0;
        0.5 + 0.5 * (distance / half_width).clamp(0.0, 1.0)
    }

    pub fn levels(&self) -> Vec<L> {
        self.bands.iter().map(|b| b.level).collect()
    }
}

// ============================================================================
// DEFAULT TABLES
// ============================================================================

fn band<L>(level: L, upper: f64) -> ThresholdBand<L> {
    ThresholdBand { level, upper }
}

impl ThresholdTable<RiskLevel> {
    pub fn seismic_default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            bands: vec![
                band(RiskLevel::Low, 0.2),
                band(RiskLevel::Moderate, 0.4),
                band(RiskLevel::Elevated, 0.6),
                band(RiskLevel::High, 0.8),
                band(RiskLevel::Critical, 1.0),
            ],
        }
    }

    pub fn flood_default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            bands: vec![
                band(RiskLevel::None, 0.2),
                band(RiskLevel::Low, 0.35),
                band(RiskLevel::Moderate, 0.5),
                band(RiskLevel::High, 0.65),
                band(RiskLevel::VeryHigh, 0.8),
                band(RiskLevel::Critical, 1.0),
            ],
        }
    }

    pub fn tsunami_default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            bands: vec![
                band(RiskLevel::None, 0.2),
                band(RiskLevel::Low, 0.4),
                band(RiskLevel::Moderate, 0.6),
                band(RiskLevel::High, 0.75),
                band(RiskLevel::Critical, 1.0),
            ],
        }
    }
}

impl Default for ThresholdTable<WarningLevel> {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            bands: vec![
                band(WarningLevel::Green, 0.25),
                band(WarningLevel::Yellow, 0.4),
                band(WarningLevel::Orange, 0.6),
                band(WarningLevel::Red, 1.0),
            ],
        }
    }
}

/// Wave height in metres
impl Default for ThresholdTable<ThreatLevel> {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 3.0,
            bands: vec![
                band(ThreatLevel::Advisory, 0.5),
                band(ThreatLevel::Watch, 1.0),
                band(ThreatLevel::Warning, 2.0),
                band(ThreatLevel::MajorWarning, 3.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_validate() {
        assert!(ThresholdTable::seismic_default().validate().is_ok());
        assert!(ThresholdTable::flood_default().validate().is_ok());
        assert!(ThresholdTable::tsunami_default().validate().is_ok());
        assert!(ThresholdTable::<WarningLevel>::default().validate().is_ok());
        assert!(ThresholdTable::<ThreatLevel>::default().validate().is_ok());
    }

    #[test]
    fn test_inclusive_upper_bounds() {
        let table = ThresholdTable::seismic_default();
        assert_eq!(table.classify(0.2), RiskLevel::Low);
        assert_eq!(table.classify(0.2000001), RiskLevel::Moderate);
        assert_eq!(table.classify(0.8), RiskLevel::High);
        assert_eq!(table.classify(0.81), RiskLevel::Critical);
    }

    #[test]
    fn test_out_of_domain_scores_are_clamped() {
        let table = ThresholdTable::flood_default();
        assert_eq!(table.classify(-0.3), RiskLevel::None);
        assert_eq!(table.classify(1.07), RiskLevel::Critical);
        assert_eq!(table.classify(f64::NAN), RiskLevel::None);

        let threat = ThresholdTable::<ThreatLevel>::default();
        assert_eq!(threat.classify(12.0), ThreatLevel::MajorWarning);
        assert_eq!(threat.classify(0.3), ThreatLevel::Advisory);
    }

    #[test]
    fn test_classified_band_contains_clamped_score() {
        let table = ThresholdTable::flood_default();
        let mut score = -0.5;
        while score <= 1.5 {
            let level = table.classify(score);
            let (lower, upper) = table.band_range(level).unwrap();
            let clamped = table.clamp(score);
            assert!(lower <= clamped && clamped <= upper, "score {} → {}", score, level);
            score += 0.01;
        }
    }

    #[test]
    fn test_non_monotonic_table_rejected() {
        let result = ThresholdTable::new(
            0.0,
            &[(RiskLevel::Low, 0.4), (RiskLevel::Moderate, 0.3), (RiskLevel::High, 1.0)],
        );
        assert!(matches!(result, Err(HazardError::Configuration(_))));

        let equal = ThresholdTable::new(0.0, &[(RiskLevel::Low, 0.5), (RiskLevel::High, 0.5)]);
        assert!(equal.is_err());
    }

    #[test]
    fn test_last_bound_must_equal_max() {
        let mut table = ThresholdTable::seismic_default();
        table.max = 1.2;
        assert!(matches!(table.validate(), Err(HazardError::Configuration(_))));
        assert!(ThresholdTable::<RiskLevel>::new(0.0, &[]).is_err());
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let result = ThresholdTable::new(0.0, &[(RiskLevel::Low, 0.5), (RiskLevel::Low, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_confidence() {
        let table = ThresholdTable::seismic_default();
        // middle of MODERATE (0.2, 0.4]
        assert!((table.confidence(0.3) - 1.0).abs() < 1e-9);
        // on the LOW/MODERATE boundary
        assert!((table.confidence(0.2) - 0.5).abs() < 1e-9);
        // domain edge is not a boundary
        assert!((table.confidence(0.0) - 1.0).abs() < 1e-9);
        let c = table.confidence(0.75);
        assert!(c > 0.5 && c < 1.0);
    }

    #[test]
    fn test_serde_uses_screaming_case() {
        let json = serde_json::to_string(&ThresholdTable::<WarningLevel>::default()).unwrap();
        assert!(json.contains("\"GREEN\""));
        let back: ThresholdTable<WarningLevel> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ThresholdTable::default());
        assert_eq!(serde_json::to_string(&RiskLevel::VeryHigh).unwrap(), "\"VERY_HIGH\"");
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::High.is_at_least(RiskLevel::Elevated));
        assert!(RiskLevel::Moderate < RiskLevel::Critical);
        assert_eq!(RiskLevel::Critical.to_string(), "CRITICAL");
    }
}
