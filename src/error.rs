//! Error types for genetic algorithm configuration and evolution.

use std::io;

/// Errors raised by the genetic algorithm.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// Invalid construction or assignment of a parameter.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A genome was used before the evaluator assigned its fitness.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    /// Roulette wheel selection was attempted before per-generation setup.
    #[error("Selector must be initialized with the population before selection")]
    SelectorNotInitialized,
    /// Configuration file could not be parsed.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GaError {
    /// Build a configuration error for a rate outside `[0, 1]`.
    pub fn rate(name: &str, value: f64) -> Self {
        Self::Configuration(format!("{name} must be between 0 and 1, got {value}"))
    }

    /// Whether this error stems from an invalid parameter.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GaError>;

/// Validate that `value` lies in `[0, 1]`. NaN is rejected.
pub(crate) fn check_rate(name: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GaError::rate(name, value))
    }
}
