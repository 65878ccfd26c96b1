//! Reports - JSON artifacts and plain-text summaries
//!
//! Files land in `<output_dir>/<name>_data.json` (+ `<name>_summary.txt`
//! for assessments).

pub mod writer;

#[cfg(test)]
mod tests;

use std::fmt::Write as _;

use crate::constants;
use crate::logic::engine::{Assessment, RegionMap};

pub use writer::{ReportFiles, ReportWriter};

/// `dispre_report_YYYYmmdd_HHMMSS`
pub fn default_report_name() -> String {
    format!("dispre_report_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}

pub fn render_assessment(assessment: &Assessment) -> String {
    let s = &assessment.seismic;
    let f = &assessment.flood;
    let t = &assessment.tsunami;
    let summary = &assessment.summary;

    let mut out = String::new();
    let _ = writeln!(out, "{} v{} - Multi-Hazard Assessment", constants::APP_NAME, constants::APP_VERSION);
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "Location: {} ({:.2}°, {:.2}°)",
        summary.location_name, assessment.location.latitude, assessment.location.longitude
    );
    let _ = writeln!(out, "Assessed: {}", assessment.assessed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out);

    let _ = writeln!(out, "Earthquake: {} (score {:.3}, confidence {:.2})", s.risk_level, s.risk_score, s.confidence);
    let _ = writeln!(
        out,
        "  expected M{:.1} [{:.1} - {:.1}], P(M>5) {:.0}%, P(M>7) {:.0}%",
        s.expected_magnitude,
        s.magnitude_range.min,
        s.magnitude_range.max,
        s.probability_m5_plus * 100.0,
        s.probability_m7_plus * 100.0
    );
    if let Some(zone) = &s.tectonic_zone {
        let _ = writeln!(out, "  tectonic zone: {} ({:.0} km)", zone.label, zone.distance_km);
    }
    let _ = writeln!(out, "  -> {}", s.recommendation);

    let _ = writeln!(
        out,
        "Flood: {} / {} (score {:.3}, confidence {:.2})",
        f.risk_level, f.warning_level, f.risk_score, f.confidence
    );
    let _ = writeln!(
        out,
        "  rainfall {:.0} mm, runoff {:.1} mm (CN {:.0}, {}), water depth {:.2} m",
        f.rainfall_mm, f.runoff_mm, f.curve_number, f.land_cover, f.water_depth_m
    );
    if let Some(basin) = &f.river_basin {
        let _ = writeln!(out, "  river basin: {} ({:.0} km)", basin.label, basin.distance_km);
    }
    let _ = writeln!(out, "  -> {}", f.recommendation);

    let _ = writeln!(out, "Tsunami: {} / {} (score {:.3})", t.risk_level, t.threat_level, t.risk_score);
    let _ = writeln!(
        out,
        "  M{:.1} ({:?}), wave {:.2} m at {:.0} km/h, arrival in {:.2} h, run-up {:.2} m",
        t.magnitude, t.magnitude_source, t.wave_height_m, t.wave_speed_kmh, t.travel_time_hours, t.run_up_m
    );
    let _ = writeln!(out, "  -> {}", t.recommendation);
    let _ = writeln!(out, "Cascade: {}", assessment.cascade.reason);
    let _ = writeln!(out);

    let secondary: Vec<&str> = summary
        .secondary_threats
        .iter()
        .map(|h| h.display_name())
        .collect();
    let _ = writeln!(
        out,
        "Overall: {} - primary threat {}{}",
        summary.overall_risk_level,
        summary.primary_threat.display_name(),
        if secondary.is_empty() {
            String::new()
        } else {
            format!(", secondary {}", secondary.join(", "))
        }
    );

    if assessment.alerts.is_empty() {
        let _ = writeln!(out, "No emergency alerts.");
    } else {
        let _ = writeln!(out, "EMERGENCY ALERTS ({}):", assessment.alerts.len());
        for alert in &assessment.alerts {
            let _ = writeln!(out, "  {}", alert.headline());
        }
    }
    out
}

pub fn render_region(map: &RegionMap) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Region lat [{:.2}, {:.2}] lon [{:.2}, {:.2}], {}x{} cells",
        map.bounds.lat_min, map.bounds.lat_max, map.bounds.lon_min, map.bounds.lon_max, map.resolution, map.resolution
    );
    for layer in [&map.seismic_risk, &map.flood_risk, &map.tsunami_wave_height] {
        let _ = writeln!(
            out,
            "  {:<20} min {:.3}  mean {:.3}  max {:.3} {} at ({:.2}°, {:.2}°)",
            layer.name, layer.min, layer.mean, layer.max, layer.unit, layer.hotspot.latitude, layer.hotspot.longitude
        );
    }
    out
}
