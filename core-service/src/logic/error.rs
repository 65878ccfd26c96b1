//! Engine errors
//!
//! Every failure in the prediction pipeline is local and synchronous.
//! A prediction either fully succeeds or returns one of these.

use thiserror::Error;

pub type HazardResult<T> = Result<T, HazardError>;

#[derive(Debug, Error)]
pub enum HazardError {
    /// Out-of-range or wrong-arity feature vector, negative physical quantity
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Prediction requested before training with lazy training disabled
    #[error("{hazard} model is not trained")]
    NotTrained { hazard: &'static str },

    /// Malformed config (non-monotonic threshold table, bad hyper-parameters)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Feature order contract broken between vector, scaler and model
    #[error(
        "feature layout mismatch for {hazard}: expected v{expected_version} ({expected_hash:08x}), \
         got v{actual_version} ({actual_hash:08x})"
    )]
    LayoutMismatch {
        hazard: String,
        expected_version: u8,
        expected_hash: u32,
        actual_version: u8,
        actual_hash: u32,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HazardError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        HazardError::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        HazardError::Configuration(msg.into())
    }

    /// Prefix the message of message-carrying kinds
    pub fn with_context(self, context: &str) -> Self {
        match self {
            HazardError::InvalidInput(msg) => HazardError::InvalidInput(format!("{}: {}", context, msg)),
            HazardError::Configuration(msg) => HazardError::Configuration(format!("{}: {}", context, msg)),
            other => other,
        }
    }

    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            HazardError::InvalidInput(_) => "invalid_input",
            HazardError::NotTrained { .. } => "not_trained",
            HazardError::Configuration(_) => "configuration_error",
            HazardError::LayoutMismatch { .. } => "layout_mismatch",
            HazardError::Io(_) => "io_error",
            HazardError::Serialization(_) => "serialization_error",
        }
    }
}

/// Reject NaN/inf and negative physical quantities
pub fn require_non_negative(name: &str, value: f64) -> HazardResult<f64> {
    if !value.is_finite() {
        return Err(HazardError::invalid(format!("{} must be finite, got {}", name, value)));
    }
    if value < 0.0 {
        return Err(HazardError::invalid(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(value)
}
