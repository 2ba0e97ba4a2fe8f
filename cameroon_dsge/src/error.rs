//! Error types for the simulator.
//!
//! Every failure is local and synchronous: the computation is deterministic,
//! so retrying with the same inputs gives the same error.

use statespace::PropagationError;
use thiserror::Error;

use crate::Variable;

#[derive(Debug, Error)]
pub enum DsgeError {
    #[error("Unknown shock type '{key}'")]
    InvalidShockType { key: String },

    #[error("Shock type '{key}' is defined more than once")]
    DuplicateShockType { key: String },

    #[error("Invalid configuration for '{parameter}': {reason}")]
    InvalidParameterConfiguration { parameter: String, reason: String },

    #[error("Invalid horizon {horizon}: at least {minimum} periods required")]
    InvalidHorizon { horizon: usize, minimum: usize },

    #[error("Invalid draw count {draws}: at least one draw required")]
    InvalidDrawCount { draws: usize },

    #[error("Non-finite value for {variable} at period {period}")]
    NumericOverflow { period: usize, variable: Variable },

    #[error("Simulation of shock '{key}' aborted: {reason}")]
    BatchFailure { key: String, reason: String },

    #[error("Malformed CSV input: {reason}")]
    MalformedCsv { reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl DsgeError {
    pub(crate) fn invalid_parameter(parameter: &str, reason: impl Into<String>) -> Self {
        DsgeError::InvalidParameterConfiguration {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<PropagationError> for DsgeError {
    fn from(err: PropagationError) -> Self {
        match err {
            PropagationError::InvalidHorizon { horizon, minimum } => {
                DsgeError::InvalidHorizon { horizon, minimum }
            }
            PropagationError::NonFinite { period, index } => DsgeError::NumericOverflow {
                period,
                variable: Variable::ALL[index],
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DsgeError>;
