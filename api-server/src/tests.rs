//! Handler tests against a small seeded engine

use std::sync::Arc;

use axum::{extract::State, Json};
use dispre_core::logic::features::FeatureOverrides;
use dispre_core::{DisasterEngine, EngineConfig};

use super::*;
use crate::models::{AllHazardsRequest, EarthquakeRequest, FloodRequest, RegionRequest, TsunamiRequest};

fn test_config() -> config::Config {
    config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        engine_config: None,
        model_dir: None,
        train_on_startup: false,
        environment: "test".to_string(),
    }
}

fn state_with(lazy_training: bool) -> AppState {
    let mut engine_config = EngineConfig::seeded(42).with_training_budget(120, 10);
    engine_config.lazy_training = lazy_training;
    AppState {
        engine: Arc::new(DisasterEngine::new(engine_config).unwrap()),
        config: test_config(),
    }
}

fn earthquake_body(latitude: f64) -> EarthquakeRequest {
    EarthquakeRequest {
        latitude,
        longitude: 140.0,
        depth_km: Some(15.0),
        crustal_strain: None,
        features: FeatureOverrides::new(),
    }
}

#[test]
fn test_health_reports_training_state() {
    let state = state_with(true);
    let Json(health) = tokio_test::block_on(handlers::health::check(State(state)));
    let body = serde_json::to_value(&health).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_trained"], false);
}

#[tokio::test]
async fn test_earthquake_prediction() {
    let state = state_with(true);
    let Json(prediction) = handlers::predict::earthquake(State(state), Json(earthquake_body(35.0)))
        .await
        .unwrap();
    assert!((0.0..=1.0).contains(&prediction.risk_score));
    assert_eq!(prediction.features["depth_km"], 15.0);
}

#[tokio::test]
async fn test_out_of_range_latitude_is_bad_request() {
    let state = state_with(true);
    let err = handlers::predict::earthquake(State(state), Json(earthquake_body(200.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_unknown_feature_is_bad_request() {
    let state = state_with(true);
    let mut body = FloodRequest {
        latitude: 35.0,
        longitude: 140.0,
        rainfall_mm: Some(75.0),
        soil_moisture: None,
        soil_type: None,
        features: FeatureOverrides::new(),
    };
    body.features.insert("wind_speed".to_string(), 3.0);

    let err = handlers::predict::flood(State(state), Json(body)).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn test_untrained_engine_is_unavailable() {
    let state = state_with(false);
    let body = TsunamiRequest {
        latitude: 35.0,
        longitude: 140.0,
        earthquake_magnitude: Some(8.0),
        epicenter_depth_km: None,
        distance_to_coast_km: None,
        features: FeatureOverrides::new(),
    };

    let err = handlers::predict::tsunami(State(state.clone()), Json(body.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotTrained(_)));

    let Json(reports) = handlers::models::train(State(state.clone())).await.unwrap();
    assert_eq!(reports.len(), 3);
    let Json(status) = handlers::models::status(State(state.clone())).await;
    assert!(status.all_trained);

    let Json(prediction) = handlers::predict::tsunami(State(state), Json(body)).await.unwrap();
    assert_eq!(prediction.magnitude, 8.0);
}

#[tokio::test]
async fn test_all_hazards() {
    let state = state_with(true);
    let body = AllHazardsRequest {
        latitude: 35.0,
        longitude: 140.0,
        rainfall_mm: Some(75.0),
        earthquake_magnitude: Some(7.0),
        soil_type: None,
        features: FeatureOverrides::new(),
    };

    let Json(assessment) = handlers::predict::all(State(state), Json(body)).await.unwrap();
    assert_eq!(assessment.flood.rainfall_mm, 75.0);
    assert_eq!(assessment.summary.location_name, "Japan (ring_of_fire)");
}

#[tokio::test]
async fn test_region_resolution_validated() {
    let state = state_with(true);
    let body = RegionRequest {
        lat_min: 30.0,
        lat_max: 40.0,
        lon_min: 135.0,
        lon_max: 145.0,
        resolution: Some(1),
        rainfall_mm: None,
        magnitude: None,
    };
    let err = handlers::predict::region(State(state.clone()), Json(body.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let Json(map) = handlers::predict::region(
        State(state),
        Json(RegionRequest {
            resolution: Some(3),
            ..body
        }),
    )
    .await
    .unwrap();
    assert_eq!(map.latitudes.len(), 3);
}

#[test]
fn test_router_builds() {
    let _router = create_router(state_with(true));
}
