//! Feature vector construction tests

use super::layout::{flood, seismic, tsunami, FLOOD_LAYOUT, SEISMIC_LAYOUT, TSUNAMI_LAYOUT};
use super::*;
use crate::logic::error::HazardError;
use crate::logic::geo::GeoPoint;

fn japan() -> GeoPoint {
    GeoPoint::new(35.0, 140.0).unwrap()
}

#[test]
fn test_defaults_fill_optional_fields() {
    let vector = FeatureVector::from_overrides(&SEISMIC_LAYOUT, Some(japan()), &FeatureOverrides::new()).unwrap();

    assert_eq!(vector.len(), 8);
    assert_eq!(vector.value(seismic::LATITUDE), 35.0);
    assert_eq!(vector.value(seismic::LONGITUDE), 140.0);
    assert_eq!(vector.value(seismic::DEPTH_KM), 10.0);
    assert_eq!(vector.value(seismic::PRESSURE), 1013.0);
    assert!(vector.validate_against(&SEISMIC_LAYOUT).is_ok());
}

#[test]
fn test_overrides_replace_defaults() {
    let mut overrides = FeatureOverrides::new();
    overrides.insert("rainfall_mm".to_string(), 75.0);
    overrides.insert("urbanization_factor".to_string(), 0.9);

    let vector = FeatureVector::from_overrides(&FLOOD_LAYOUT, Some(japan()), &overrides).unwrap();
    assert_eq!(vector.value(flood::RAINFALL_MM), 75.0);
    assert_eq!(vector.value(flood::URBANIZATION), 0.9);
    assert_eq!(vector.get_by_name("soil_moisture"), Some(0.4));
}

#[test]
fn test_location_overrides_conflict_with_location() {
    let mut overrides = FeatureOverrides::new();
    overrides.insert("longitude".to_string(), -20.0);
    for layout in [&SEISMIC_LAYOUT, &TSUNAMI_LAYOUT] {
        let result = FeatureVector::from_overrides(layout, Some(japan()), &overrides);
        assert!(matches!(result, Err(HazardError::InvalidInput(msg)) if msg.contains("longitude")));
    }
    assert!(reject_location_overrides(&FeatureOverrides::new()).is_ok());
}

#[test]
fn test_missing_location_is_invalid() {
    let result = FeatureVector::from_overrides(&TSUNAMI_LAYOUT, None, &FeatureOverrides::new());
    assert!(matches!(result, Err(HazardError::InvalidInput(msg)) if msg.contains("latitude")));
}

#[test]
fn test_latitude_200_rejected_for_every_layout_with_latitude() {
    for layout in [&SEISMIC_LAYOUT, &TSUNAMI_LAYOUT] {
        let result = FeatureVector::builder(layout)
            .set("latitude", 200.0)
            .set("longitude", 140.0)
            .build();
        assert!(matches!(result, Err(HazardError::InvalidInput(_))), "{:?}", layout.hazard);
    }
}

#[test]
fn test_wrong_arity_rejected() {
    let result = FeatureVector::from_values(&FLOOD_LAYOUT, vec![1.0; 7]);
    assert!(matches!(result, Err(HazardError::InvalidInput(_))));
}

#[test]
fn test_unknown_feature_rejected() {
    let result = FeatureVector::builder(&FLOOD_LAYOUT).set("snowfall_mm", 3.0).build();
    assert!(matches!(result, Err(HazardError::InvalidInput(msg)) if msg.contains("snowfall_mm")));
}

#[test]
fn test_non_finite_rejected() {
    let result = FeatureVector::builder(&FLOOD_LAYOUT).set("rainfall_mm", f64::NAN).build();
    assert!(result.is_err());
}

#[test]
fn test_location_only_applies_to_layouts_with_coordinates() {
    let vector = FeatureVector::builder(&FLOOD_LAYOUT).location(japan()).build().unwrap();
    assert_eq!(vector.location(), None);

    let vector = FeatureVector::builder(&TSUNAMI_LAYOUT).location(japan()).build().unwrap();
    assert_eq!(vector.location(), Some(japan()));
    assert_eq!(vector.value(tsunami::MAGNITUDE), 7.0);
}

#[test]
fn test_vector_from_other_hazard_fails_validation() {
    let vector = FeatureVector::builder(&FLOOD_LAYOUT).build().unwrap();
    assert!(vector.validate_against(&SEISMIC_LAYOUT).is_err());
}

#[test]
fn test_with_value_checks_range() {
    let vector = FeatureVector::builder(&FLOOD_LAYOUT).build().unwrap();
    let wetter = vector.with_value(flood::RAINFALL_MM, 120.0).unwrap();
    assert_eq!(wetter.value(flood::RAINFALL_MM), 120.0);
    assert!(vector.with_value(flood::RAINFALL_MM, -1.0).is_err());
}

#[test]
fn test_log_entry_has_named_values() {
    let vector = FeatureVector::builder(&FLOOD_LAYOUT).build().unwrap();
    let entry = vector.to_log_entry();
    assert_eq!(entry["hazard"], "flood");
    assert_eq!(entry["named_values"]["rainfall_mm"], 50.0);
}
