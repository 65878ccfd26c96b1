use super::registry::{Zone, ZoneCategory};
use crate::logic::geo::GeoBox;

fn zone(
    name: &str,
    category: ZoneCategory,
    group: Option<&str>,
    lat: (f64, f64),
    lon: (f64, f64),
    weight: f64,
    max_magnitude: Option<f64>,
) -> Zone {
    Zone {
        name: name.to_string(),
        category,
        group: group.map(String::from),
        bounds: GeoBox::new(lat, lon),
        weight,
        max_magnitude,
    }
}

pub(super) fn builtin_zones() -> Vec<Zone> {
    use ZoneCategory::*;

    const RING: Option<&str> = Some("ring_of_fire");
    const ALPINE: Option<&str> = Some("alpine_belt");

    vec![
        // Tectonic
        zone("Pacific Northwest", Tectonic, RING, (45.0, 50.0), (-125.0, -120.0), 0.8, None),
        zone("California", Tectonic, RING, (32.0, 42.0), (-125.0, -114.0), 0.85, None),
        zone("Mexico", Tectonic, RING, (14.0, 20.0), (-105.0, -95.0), 0.75, None),
        zone("Japan", Tectonic, RING, (30.0, 45.0), (130.0, 145.0), 0.9, None),
        zone("Philippines", Tectonic, RING, (5.0, 20.0), (120.0, 135.0), 0.8, None),
        zone("Mediterranean", Tectonic, ALPINE, (30.0, 45.0), (-10.0, 45.0), 0.7, None),
        zone("India-Himalayas", Tectonic, ALPINE, (24.0, 35.0), (68.0, 95.0), 0.75, None),
        zone("Central Asia", Tectonic, ALPINE, (35.0, 50.0), (65.0, 100.0), 0.7, None),
        // River basins
        zone("Ganga", FloodBasin, None, (22.0, 32.0), (72.0, 88.0), 0.7, None),
        zone("Brahmaputra", FloodBasin, None, (24.0, 30.0), (88.0, 95.0), 0.75, None),
        zone("Amazon", FloodBasin, None, (-10.0, 5.0), (-75.0, -50.0), 0.7, None),
        zone("Mississippi", FloodBasin, None, (28.0, 45.0), (-100.0, -85.0), 0.6, None),
        zone("Yangtze", FloodBasin, None, (28.0, 35.0), (108.0, 120.0), 0.65, None),
        // Subduction zones
        zone("Cascadia", Subduction, None, (43.0, 49.0), (-126.0, -123.0), 0.8, Some(9.0)),
        zone("Japan Trench", Subduction, None, (30.0, 45.0), (140.0, 145.0), 0.8, Some(9.2)),
        zone("Kuril-Kamchatka", Subduction, None, (45.0, 60.0), (150.0, 160.0), 0.8, Some(8.8)),
        zone("Indian Ocean", Subduction, None, (-10.0, 5.0), (90.0, 100.0), 0.8, Some(9.0)),
        zone("Peru-Chile", Subduction, None, (-50.0, -10.0), (-80.0, -70.0), 0.8, Some(9.5)),
        // Coastlines (weight = coastal vulnerability)
        zone("Japanese Coast", Coastline, None, (30.0, 45.0), (130.0, 145.0), 0.9, None),
        zone("Indian Ocean Rim", Coastline, None, (-10.0, 5.0), (40.0, 100.0), 0.85, None),
        zone("Pacific Northwest Coast", Coastline, None, (43.0, 49.0), (-127.0, -123.0), 0.8, None),
        zone("California Coast", Coastline, None, (32.0, 42.0), (-125.0, -117.0), 0.7, None),
        zone("Chilean Coast", Coastline, None, (-50.0, -10.0), (-80.0, -70.0), 0.75, None),
    ]
}
