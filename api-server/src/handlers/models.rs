//! Model lifecycle handlers

use axum::{extract::State, Json};
use dispre_core::logic::engine::EngineStatus;
use dispre_core::logic::model::TrainingReport;

use super::blocking;
use crate::{AppResult, AppState};

/// Retrain every hazard model from fresh synthetic data
pub async fn train(State(state): State<AppState>) -> AppResult<Json<Vec<TrainingReport>>> {
    let reports = blocking(&state.engine, |engine| engine.train_all()).await?;
    tracing::info!(models = reports.len(), "Models retrained");
    Ok(Json(reports))
}

pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.engine.status())
}
