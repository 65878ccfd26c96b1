//! Feature Vector - validated model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Values are stored in layout order; construction rejects wrong arity,
//! unknown names, missing required fields and out-of-range values instead
//! of clamping them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{FeatureLayout, HazardKind, LAYOUT_VERSION, LOCATION_FEATURES};
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::geo::GeoPoint;

/// Caller-supplied feature values by name
pub type FeatureOverrides = BTreeMap<String, f64>;

/// Latitude/longitude come from the prediction location only; an override
/// would let the scored vector and the zone lookups disagree on the place.
pub fn reject_location_overrides(overrides: &FeatureOverrides) -> HazardResult<()> {
    match LOCATION_FEATURES.iter().find(|name| overrides.contains_key(**name)) {
        Some(name) => Err(HazardError::invalid(format!(
            "'{}' cannot be overridden; set the prediction location instead",
            name
        ))),
        None => Ok(()),
    }
}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub hazard: HazardKind,
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create from raw values in layout order
    pub fn from_values(layout: &'static FeatureLayout, values: Vec<f64>) -> HazardResult<Self> {
        if values.len() != layout.len() {
            return Err(HazardError::invalid(format!(
                "{} expects {} features, got {}",
                layout.hazard,
                layout.len(),
                values.len()
            )));
        }
        for (spec, value) in layout.features.iter().zip(&values) {
            spec.check(*value)?;
        }
        Ok(Self {
            hazard: layout.hazard,
            version: LAYOUT_VERSION,
            layout_hash: layout.hash(),
            values,
        })
    }

    /// Named overrides on top of layout defaults, location filling lat/lon
    pub fn from_overrides(
        layout: &'static FeatureLayout,
        location: Option<GeoPoint>,
        overrides: &FeatureOverrides,
    ) -> HazardResult<Self> {
        let mut builder = FeatureVectorBuilder::new(layout);
        if let Some(point) = location {
            reject_location_overrides(overrides)?;
            builder = builder.location(point);
        }
        for (name, value) in overrides {
            builder = builder.set(name, *value);
        }
        builder.build()
    }

    pub fn builder(layout: &'static FeatureLayout) -> FeatureVectorBuilder {
        FeatureVectorBuilder::new(layout)
    }

    pub fn layout(&self) -> &'static FeatureLayout {
        self.hazard.layout()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by layout index constant
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        self.layout().index_of(name).and_then(|i| self.get(i))
    }

    /// Copy with one feature replaced (range-checked)
    pub fn with_value(&self, index: usize, value: f64) -> HazardResult<Self> {
        let spec = self
            .layout()
            .spec(index)
            .ok_or_else(|| HazardError::invalid(format!("feature index {} out of bounds", index)))?;
        spec.check(value)?;
        let mut copy = self.clone();
        copy.values[index] = value;
        Ok(copy)
    }

    pub fn location(&self) -> Option<GeoPoint> {
        let (lat, lon) = self.layout().location_indices()?;
        Some(GeoPoint {
            latitude: self.values[lat],
            longitude: self.values[lon],
        })
    }

    /// Validate that this vector belongs to `layout` and is still in range
    pub fn validate_against(&self, layout: &FeatureLayout) -> HazardResult<()> {
        if self.hazard != layout.hazard {
            return Err(HazardError::invalid(format!(
                "{} vector passed to {} model",
                self.hazard, layout.hazard
            )));
        }
        layout.validate(self.version, self.layout_hash)?;
        if self.values.len() != layout.len() {
            return Err(HazardError::invalid(format!(
                "{} expects {} features, got {}",
                layout.hazard,
                layout.len(),
                self.values.len()
            )));
        }
        for (spec, value) in layout.features.iter().zip(&self.values) {
            spec.check(*value)?;
        }
        Ok(())
    }

    pub fn named_values(&self) -> BTreeMap<String, f64> {
        self.layout()
            .features
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| (spec.name.to_string(), *value))
            .collect()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "hazard": self.hazard,
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": self.named_values(),
        })
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder collecting named values; errors surface at `build()`
pub struct FeatureVectorBuilder {
    layout: &'static FeatureLayout,
    values: Vec<Option<f64>>,
    unknown: Vec<String>,
}

impl FeatureVectorBuilder {
    pub fn new(layout: &'static FeatureLayout) -> Self {
        Self {
            layout,
            values: layout.features.iter().map(|f| f.default).collect(),
            unknown: Vec::new(),
        }
    }

    pub fn set(mut self, name: &str, value: f64) -> Self {
        match self.layout.index_of(name) {
            Some(index) => self.values[index] = Some(value),
            None => self.unknown.push(name.to_string()),
        }
        self
    }

    pub fn set_index(mut self, index: usize, value: f64) -> Self {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(value);
        }
        self
    }

    /// Fill latitude/longitude when the layout has them; no-op otherwise
    pub fn location(mut self, point: GeoPoint) -> Self {
        if let Some((lat, lon)) = self.layout.location_indices() {
            self.values[lat] = Some(point.latitude);
            self.values[lon] = Some(point.longitude);
        }
        self
    }

    pub fn build(self) -> HazardResult<FeatureVector> {
        if !self.unknown.is_empty() {
            return Err(HazardError::invalid(format!(
                "unknown {} feature(s): {}",
                self.layout.hazard,
                self.unknown.join(", ")
            )));
        }

        let mut values = Vec::with_capacity(self.values.len());
        for (spec, value) in self.layout.features.iter().zip(self.values) {
            let value = value.ok_or_else(|| {
                HazardError::invalid(format!("missing required feature '{}'", spec.name))
            })?;
            values.push(value);
        }

        FeatureVector::from_values(self.layout, values)
    }
}
