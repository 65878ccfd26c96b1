use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::builtin::builtin_zones;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::geo::{GeoBox, GeoPoint};

static BUILTIN: Lazy<ZoneRegistry> = Lazy::new(|| ZoneRegistry {
    zones: builtin_zones(),
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCategory {
    Tectonic,
    FloodBasin,
    Subduction,
    Coastline,
}

impl ZoneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneCategory::Tectonic => "tectonic",
            ZoneCategory::FloodBasin => "flood_basin",
            ZoneCategory::Subduction => "subduction",
            ZoneCategory::Coastline => "coastline",
        }
    }
}

impl fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub category: ZoneCategory,
    /// Parent belt, e.g. `ring_of_fire`
    pub group: Option<String>,
    pub bounds: GeoBox,
    /// Risk weighting coefficient in [0, 1]
    pub weight: f64,
    /// Largest credible magnitude (subduction zones)
    pub max_magnitude: Option<f64>,
}

impl Zone {
    /// "Japan (ring_of_fire)" or just the name
    pub fn label(&self) -> String {
        match &self.group {
            Some(group) => format!("{} ({})", self.name, group),
            None => self.name.clone(),
        }
    }
}

/// Result of a proximity lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneMatch {
    pub name: String,
    pub label: String,
    pub category: ZoneCategory,
    pub weight: f64,
    /// 0 when the point is inside the zone
    pub distance_km: f64,
    pub max_magnitude: Option<f64>,
}

impl ZoneMatch {
    fn from_zone(zone: &Zone, distance_km: f64) -> Self {
        Self {
            name: zone.name.clone(),
            label: zone.label(),
            category: zone.category,
            weight: zone.weight,
            distance_km,
            max_magnitude: zone.max_magnitude,
        }
    }

    pub fn is_inside(&self) -> bool {
        self.distance_km == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    /// Process-wide registry, built once on first use
    pub fn builtin() -> &'static ZoneRegistry {
        &BUILTIN
    }

    pub fn new(zones: Vec<Zone>) -> HazardResult<Self> {
        for zone in &zones {
            zone.bounds
                .validate()
                .map_err(|e| e.with_context(&format!("zone '{}'", zone.name)))?;
            if !(0.0..=1.0).contains(&zone.weight) {
                return Err(HazardError::invalid(format!(
                    "zone '{}' weight {} outside [0, 1]",
                    zone.name, zone.weight
                )));
            }
        }
        Ok(Self { zones })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zones(&self, category: ZoneCategory) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.category == category)
    }

    /// Highest-weight zone of `category` containing the point
    pub fn containing(&self, category: ZoneCategory, point: &GeoPoint) -> Option<&Zone> {
        self.zones(category)
            .filter(|z| z.bounds.contains(point))
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
    }

    /// Weight of the containing zone, if any
    pub fn weight_at(&self, category: ZoneCategory, point: &GeoPoint) -> Option<f64> {
        self.containing(category, point).map(|z| z.weight)
    }

    /// Containing zone, else the closest one within `max_distance_km`
    pub fn nearest(&self, category: ZoneCategory, point: &GeoPoint, max_distance_km: f64) -> Option<ZoneMatch> {
        if let Some(zone) = self.containing(category, point) {
            return Some(ZoneMatch::from_zone(zone, 0.0));
        }

        self.zones(category)
            .map(|z| (z, z.bounds.distance_km(point)))
            .filter(|(_, d)| *d <= max_distance_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(z, d)| ZoneMatch::from_zone(z, d))
    }

    /// Coastal = within `within_km` of a registry coastline
    pub fn is_coastal(&self, point: &GeoPoint, within_km: f64) -> bool {
        self.nearest(ZoneCategory::Coastline, point, within_km).is_some()
    }
}
