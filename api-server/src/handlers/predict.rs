//! Prediction handlers

use axum::{extract::State, Json};
use dispre_core::logic::engine::{Assessment, RegionMap};
use dispre_core::logic::hazard::{FloodPrediction, SeismicPrediction, TsunamiPrediction};
use validator::Validate;

use super::blocking;
use crate::models::{AllHazardsRequest, EarthquakeRequest, FloodRequest, RegionRequest, TsunamiRequest};
use crate::{AppResult, AppState};

/// Earthquake risk at a point
pub async fn earthquake(
    State(state): State<AppState>,
    Json(req): Json<EarthquakeRequest>,
) -> AppResult<Json<SeismicPrediction>> {
    req.validate()?;
    let input = req.into_input();
    let prediction = blocking(&state.engine, move |engine| engine.predict_seismic(&input)).await?;
    Ok(Json(prediction))
}

pub async fn flood(
    State(state): State<AppState>,
    Json(req): Json<FloodRequest>,
) -> AppResult<Json<FloodPrediction>> {
    req.validate()?;
    let input = req.into_input();
    let prediction = blocking(&state.engine, move |engine| engine.predict_flood(&input)).await?;
    Ok(Json(prediction))
}

pub async fn tsunami(
    State(state): State<AppState>,
    Json(req): Json<TsunamiRequest>,
) -> AppResult<Json<TsunamiPrediction>> {
    req.validate()?;
    let input = req.into_input();
    let prediction = blocking(&state.engine, move |engine| engine.predict_tsunami(&input)).await?;
    Ok(Json(prediction))
}

/// All hazards with cascade, summary and emergency alerts
pub async fn all(
    State(state): State<AppState>,
    Json(req): Json<AllHazardsRequest>,
) -> AppResult<Json<Assessment>> {
    req.validate()?;
    let request = req.into_request();
    let assessment = blocking(&state.engine, move |engine| engine.assess(&request)).await?;
    if !assessment.alerts.is_empty() {
        tracing::warn!(
            alerts = assessment.alerts.len(),
            location = %assessment.summary.location_name,
            "Emergency alerts issued"
        );
    }
    Ok(Json(assessment))
}

pub async fn region(
    State(state): State<AppState>,
    Json(req): Json<RegionRequest>,
) -> AppResult<Json<RegionMap>> {
    req.validate()?;
    let request = req.into_request();
    let map = blocking(&state.engine, move |engine| engine.predict_region(&request)).await?;
    Ok(Json(map))
}
