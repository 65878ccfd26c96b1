//! Geographic primitives
//!
//! Validated points, bounding boxes and great-circle distance.

use serde::{Deserialize, Serialize};

use super::error::{HazardError, HazardResult};

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Validated (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> HazardResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(HazardError::invalid(format!(
                "latitude {} outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(HazardError::invalid(format!(
                "longitude {} outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// Re-check a point that may have been deserialized without validation
    pub fn validate(&self) -> HazardResult<()> {
        Self::new(self.latitude, self.longitude).map(|_| ())
    }

    /// Haversine distance in km
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    pub fn label(&self) -> String {
        format!("Location ({:.2}°, {:.2}°)", self.latitude, self.longitude)
    }
}

/// Axis-aligned lat/lon box (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBox {
    pub const fn new(lat: (f64, f64), lon: (f64, f64)) -> Self {
        Self {
            lat_min: lat.0,
            lat_max: lat.1,
            lon_min: lon.0,
            lon_max: lon.1,
        }
    }

    pub fn validate(&self) -> HazardResult<()> {
        GeoPoint::new(self.lat_min, self.lon_min)?;
        GeoPoint::new(self.lat_max, self.lon_max)?;
        if self.lat_min > self.lat_max || self.lon_min > self.lon_max {
            return Err(HazardError::invalid(format!(
                "inverted bounds: lat [{}, {}], lon [{}, {}]",
                self.lat_min, self.lat_max, self.lon_min, self.lon_max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.latitude)
            && (self.lon_min..=self.lon_max).contains(&point.longitude)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.lat_min + self.lat_max) / 2.0,
            longitude: (self.lon_min + self.lon_max) / 2.0,
        }
    }

    /// Closest point of the box to `point` (clamped lat/lon).
    ///
    /// The longitude is clamped from whichever of `lon`, `lon ± 360` lies
    /// nearest the box, so points across the antimeridian snap to the
    /// near edge rather than the far one.
    pub fn nearest_point(&self, point: &GeoPoint) -> GeoPoint {
        let gap = |lon: f64| (self.lon_min - lon).max(lon - self.lon_max).max(0.0);
        let lon = [point.longitude, point.longitude - 360.0, point.longitude + 360.0]
            .into_iter()
            .min_by(|a, b| gap(*a).total_cmp(&gap(*b)))
            .unwrap_or(point.longitude);
        GeoPoint {
            latitude: point.latitude.clamp(self.lat_min, self.lat_max),
            longitude: lon.clamp(self.lon_min, self.lon_max),
        }
    }

    /// 0 when inside, otherwise distance to the nearest edge point
    pub fn distance_km(&self, point: &GeoPoint) -> f64 {
        if self.contains(point) {
            return 0.0;
        }
        point.distance_km(&self.nearest_point(point))
    }

    /// Evenly spaced grid (row-major, latitude rows) including both edges
    pub fn grid(&self, resolution: usize) -> (Vec<f64>, Vec<f64>) {
        (
            linspace(self.lat_min, self.lat_max, resolution),
            linspace(self.lon_min, self.lon_max, resolution),
        )
    }
}

pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}
