//! Health check and service info handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    models_trained: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        models_trained: state.engine.is_trained(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

#[derive(Serialize)]
pub struct InfoResponse {
    service: &'static str,
    version: &'static str,
    environment: String,
    hazards: [&'static str; 3],
    endpoints: Vec<&'static str>,
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service: "DISPRE Disaster Prediction API",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        hazards: ["earthquake", "flood", "tsunami"],
        endpoints: vec![
            "GET /health",
            "POST /api/v1/predict/earthquake",
            "POST /api/v1/predict/flood",
            "POST /api/v1/predict/tsunami",
            "POST /api/v1/predict/all",
            "POST /api/v1/predict/region",
            "POST /api/v1/models/train",
            "GET /api/v1/models/status",
        ],
    })
}
