//! Model persistence
//!
//! One JSON artifact per hazard holding ensemble, scaler, layout and report.
//! Loading refuses artifacts from another hazard or feature layout.

use std::fs;
use std::path::{Path, PathBuf};

use super::TrainedModel;
use crate::logic::error::{HazardError, HazardResult};
use crate::logic::features::HazardKind;

/// `<dir>/<hazard>_model.json`
pub fn model_path(dir: &Path, hazard: HazardKind) -> PathBuf {
    dir.join(format!("{}_model.json", hazard))
}

/// Save model to disk
pub fn save_model(model: &TrainedModel, path: &Path) -> HazardResult<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec(model)?;
    fs::write(path, json)?;
    log::info!("Saved {} model to {}", model.hazard, path.display());
    Ok(())
}

/// Load model from disk with hazard + layout validation
pub fn load_model(path: &Path, expected: HazardKind) -> HazardResult<TrainedModel> {
    let data = fs::read(path)?;
    let model: TrainedModel = serde_json::from_slice(&data)?;

    if model.hazard != expected {
        return Err(HazardError::invalid(format!(
            "{} contains a {} model, expected {}",
            path.display(),
            model.hazard,
            expected
        )));
    }
    model.check_consistency()?;

    log::info!(
        "Loaded {} model from {} (trained {})",
        model.hazard,
        path.display(),
        model.report.trained_at
    );
    Ok(model)
}
