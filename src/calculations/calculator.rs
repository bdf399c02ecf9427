use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A flow formula evaluated one level sample at a time.
///
/// Implementors return the raw physical value in SI units (m³/s, or m/s for velocity);
/// unit conversion and degeneracy handling happen once, in the series layer.
pub trait FlowCalculator {
    fn perform_calculation(&self, level: f64) -> f64;

    fn degeneracy_policy(&self) -> DegeneracyPolicy;

    fn resolve(&self, level: f64) -> Option<f64> {
        self.degeneracy_policy()
            .apply(self.perform_calculation(level))
    }
}

/// What happens to a sample whose computed value is NaN or infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegeneracyPolicy {
    /// Replace with `0.0`. Used by the weir model.
    ZeroFill,
    /// Leave a gap in the output. Used by the pipe model.
    Missing,
}

impl DegeneracyPolicy {
    pub fn apply(self, value: f64) -> Option<f64> {
        if value.is_finite() {
            return Some(value);
        }
        match self {
            DegeneracyPolicy::ZeroFill => Some(0.0),
            DegeneracyPolicy::Missing => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CalculationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Head loss correction did not converge after {iterations} iterations (residual {residual})")]
    ConvergenceFailure { iterations: usize, residual: f64 },
    #[error("Series error: {0}")]
    Series(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl CalculationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CalculationError::InvalidParameter(message.into())
    }
}

/// Rejects NaN/infinite values and values not strictly above zero.
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64, CalculationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalculationError::invalid(format!(
            "{} must be a positive number, got {}",
            name, value
        )));
    }
    Ok(value)
}

pub(crate) fn require_finite(name: &str, value: f64) -> Result<f64, CalculationError> {
    if !value.is_finite() {
        return Err(CalculationError::invalid(format!(
            "{} must be a number, got {}",
            name, value
        )));
    }
    Ok(value)
}
