//! Tsunami wave quantities (shallow-water approximation)

use crate::logic::error::{require_non_negative, HazardError, HazardResult};

/// Scales seismic moment into a source wave height (m)
const MOMENT_SCALE: f64 = 2e16;
/// e-folding depth (km) for energy lost to deep ruptures
const DEPTH_ATTENUATION_KM: f64 = 50.0;
/// Reference ocean depth (m) for source amplification
const REFERENCE_OCEAN_DEPTH_M: f64 = 1000.0;
/// Distance scale (km) of the geometric spreading term
const SPREADING_DISTANCE_KM: f64 = 100.0;
/// Shortest time to escape reported, whatever the buffer
const MIN_ESCAPE_MINUTES: f64 = 5.0;

/// v = √(g·h), m/s
pub fn wave_speed_ms(ocean_depth_m: f64, gravity: f64) -> HazardResult<f64> {
    let depth = require_non_negative("ocean_depth_m", ocean_depth_m)?;
    if !(gravity.is_finite() && gravity > 0.0) {
        return Err(HazardError::invalid(format!("gravity must be positive, got {}", gravity)));
    }
    Ok((gravity * depth).sqrt())
}

/// M0 = 10^(1.5·Mw + 4.8)
pub fn seismic_moment(magnitude: f64) -> f64 {
    10f64.powf(1.5 * magnitude + 4.8)
}

/// Kajiura-style estimate: source height from moment, damped by rupture depth,
/// amplified by ocean depth, attenuated with distance to the coast
pub fn max_wave_height_m(
    magnitude: f64,
    epicenter_depth_km: f64,
    ocean_depth_m: f64,
    distance_km: f64,
    cap_m: f64,
) -> HazardResult<f64> {
    let magnitude = require_non_negative("earthquake_magnitude", magnitude)?;
    let depth = require_non_negative("epicenter_depth_km", epicenter_depth_km)?;
    let ocean = require_non_negative("ocean_depth_m", ocean_depth_m)?;
    let distance = require_non_negative("distance_to_coast_km", distance_km)?;

    let source = seismic_moment(magnitude) / MOMENT_SCALE;
    let depth_factor = (-depth / DEPTH_ATTENUATION_KM).exp();
    let ocean_factor = (ocean / REFERENCE_OCEAN_DEPTH_M).sqrt();
    let spreading = (1.0 + distance / SPREADING_DISTANCE_KM).powf(-0.5);

    Ok((source * depth_factor * ocean_factor * spreading).min(cap_m))
}

/// Hours for the wave to cover `distance_km` at `speed_ms`
pub fn travel_time_hours(distance_km: f64, speed_ms: f64) -> HazardResult<f64> {
    let distance = require_non_negative("distance_to_coast_km", distance_km)?;
    if !(speed_ms.is_finite() && speed_ms > 0.0) {
        return Err(HazardError::invalid(format!(
            "wave speed must be positive to compute travel time, got {}",
            speed_ms
        )));
    }
    Ok(distance / (speed_ms * 3.6))
}

pub fn time_to_escape_minutes(travel_time_hours: f64, buffer_minutes: f64) -> f64 {
    (travel_time_hours * 60.0 - buffer_minutes).max(MIN_ESCAPE_MINUTES)
}

pub fn inundation_depth_m(wave_height_m: f64, coast_slope: f64) -> HazardResult<f64> {
    let height = require_non_negative("wave_height_m", wave_height_m)?;
    let slope = require_non_negative("coast_slope", coast_slope)?;
    Ok(height * slope * 10.0)
}

pub fn run_up_m(wave_height_m: f64, coast_slope: f64, shoaling_factor: f64) -> HazardResult<f64> {
    let height = require_non_negative("wave_height_m", wave_height_m)?;
    let slope = require_non_negative("coast_slope", coast_slope)?;
    Ok(height * shoaling_factor * slope)
}

/// km²
pub fn affected_area_km2(wave_height_m: f64, inundation_depth_m: f64) -> f64 {
    wave_height_m.max(0.0) * inundation_depth_m.max(0.0) * 100.0
}
