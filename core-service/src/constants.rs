//! Central Configuration Constants
//!
//! Single source of truth for process-level defaults.
//! Engine tuning lives in `logic::config`; this file only covers values
//! read from the environment.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "DISPRE";

/// Directory name used under the platform data dir
pub const APP_DIR_NAME: &str = "dispre";

/// Seed used by the CLI demo and the test suite
pub const DEFAULT_SEED: u64 = 42;

/// Default number of synthetic samples per hazard
pub const DEFAULT_TRAINING_SAMPLES: usize = 500;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Engine config file from `DISPRE_CONFIG`, if set
pub fn get_config_path() -> Option<PathBuf> {
    std::env::var("DISPRE_CONFIG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Training seed from `DISPRE_SEED`, if set and numeric
pub fn get_seed() -> Option<u64> {
    std::env::var("DISPRE_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Report output directory from `DISPRE_OUTPUT_DIR` or the platform default
pub fn get_output_dir() -> PathBuf {
    std::env::var("DISPRE_OUTPUT_DIR")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_output_dir)
}

/// `<data_local_dir>/dispre/output`
pub fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("output")
}

/// `<data_local_dir>/dispre/models`
pub fn default_model_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join("models")
}
