//! Configuration module

use std::env;
use std::path::PathBuf;

use dispre_core::{EngineConfig, HazardResult};

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Engine config file (JSON); engine defaults when unset
    pub engine_config: Option<PathBuf>,

    /// Saved models loaded at startup when present
    pub model_dir: Option<PathBuf>,

    /// Train all models before serving
    pub train_on_startup: bool,

    /// Environment (development, production)
    pub environment: String,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            engine_config: non_empty("DISPRE_CONFIG").map(PathBuf::from),

            model_dir: non_empty("DISPRE_MODEL_DIR").map(PathBuf::from),

            train_on_startup: env::var("TRAIN_ON_STARTUP")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),

            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        }
    }

    /// Engine config from `engine_config`, with `DISPRE_SEED` applied
    pub fn engine(&self) -> HazardResult<EngineConfig> {
        let mut config = match &self.engine_config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = dispre_core::constants::get_seed() {
            config.seed = Some(seed);
        }
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
