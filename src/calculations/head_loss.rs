use serde::{Deserialize, Serialize};

use super::calculator::{require_positive, CalculationError, FlowCalculator};
use super::pipe_flow_calculator::{pipe_flow, PipeFlowCalculator, PipeOutput, PipeParameters};
use super::units::Unit;
use crate::series::time_series::{FlowSeries, LevelSeries};

/// Gravitational acceleration used by the velocity head term, m/s².
/// Differs from the pipe formula's 9.81; both are kept as they are.
pub const HEAD_LOSS_GRAVITY: f64 = 9.82;
pub const HEAD_LOSS_COEFFICIENT: f64 = 1.5;

pub const DEFAULT_TOLERANCE: f64 = 0.005;
pub const DEFAULT_MAX_ITERATIONS: usize = 150;

/// Level rise caused by the kinetic energy of water moving at `velocity`.
pub fn velocity_head_loss(velocity: f64) -> f64 {
    HEAD_LOSS_COEFFICIENT * velocity.powi(2) / (2.0 * HEAD_LOSS_GRAVITY)
}

/// Pipe flow computed from the level with one velocity head correction applied.
pub fn pipe_flow_with_head_loss(
    level: &LevelSeries,
    params: &PipeParameters,
    unit: Unit,
) -> Result<FlowSeries, CalculationError> {
    let velocity = pipe_flow(level, params, Unit::CubicMetersPerSecond, PipeOutput::Velocity)?;

    let corrected: Vec<f64> = level
        .values()
        .iter()
        .zip(velocity.values())
        .map(|(&h, &v)| h - v.map(velocity_head_loss).unwrap_or(0.0))
        .collect();

    log::debug!("Applied velocity head correction to {} samples", corrected.len());
    pipe_flow(&level.with_values(corrected)?, params, unit, PipeOutput::Flow)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceCriterion {
    /// Compare the sums of the current and candidate levels.
    #[default]
    Aggregate,
    /// Compare every sample; the largest difference must be within tolerance.
    PerSample,
}

impl ConvergenceCriterion {
    /// Samples where either side is undefined do not count.
    fn residual(&self, current: &[f64], candidate: &[f64]) -> f64 {
        let pairs = current
            .iter()
            .zip(candidate)
            .filter(|(a, b)| a.is_finite() && b.is_finite());
        match self {
            ConvergenceCriterion::Aggregate => {
                let (sum_current, sum_candidate) = pairs
                    .fold((0.0, 0.0), |(sa, sb), (a, b)| (sa + a, sb + b));
                (sum_current - sum_candidate).abs()
            }
            ConvergenceCriterion::PerSample => {
                pairs.map(|(a, b)| (a - b).abs()).fold(0.0, f64::max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadLossOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub criterion: ConvergenceCriterion,
}

impl Default for HeadLossOptions {
    fn default() -> Self {
        HeadLossOptions {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            criterion: ConvergenceCriterion::Aggregate,
        }
    }
}

impl HeadLossOptions {
    pub fn validate(&self) -> Result<(), CalculationError> {
        require_positive("Tolerance", self.tolerance)?;
        if self.max_iterations == 0 {
            return Err(CalculationError::invalid("At least one iteration is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceState {
    Iterating,
    Converged,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvergedLevel {
    pub level: LevelSeries,
    pub iterations: usize,
}

/// Iterates `h = h0 - Δh(v(h))` until the level stops moving.
///
/// Returns the corrected level, not a flow; run it through [`pipe_flow`] afterwards.
/// Undefined velocities contribute no head loss.
pub fn converge_head_loss(
    level: &LevelSeries,
    params: &PipeParameters,
    options: &HeadLossOptions,
) -> Result<ConvergedLevel, CalculationError> {
    options.validate()?;
    let calculator = PipeFlowCalculator::new(params, PipeOutput::Velocity)?;

    let original = level.values();
    let mut current: Vec<f64> = original.to_vec();
    let mut state = ConvergenceState::Iterating;
    let mut iterations = 0;
    let mut residual = f64::NAN;

    while state == ConvergenceState::Iterating {
        iterations += 1;
        let candidate: Vec<f64> = current
            .iter()
            .zip(original)
            .map(|(&h, &h0)| h0 - calculator.resolve(h).map(velocity_head_loss).unwrap_or(0.0))
            .collect();

        residual = options.criterion.residual(&current, &candidate);
        log::debug!("Head loss iteration {}: residual {}", iterations, residual);

        state = if residual < options.tolerance {
            ConvergenceState::Converged
        } else if iterations >= options.max_iterations {
            ConvergenceState::Failed
        } else {
            current = candidate;
            ConvergenceState::Iterating
        };
    }

    match state {
        ConvergenceState::Converged => {
            log::info!("Head loss correction converged after {} iterations", iterations);
            Ok(ConvergedLevel {
                level: level.with_values(current)?,
                iterations,
            })
        }
        _ => {
            log::error!(
                "Head loss correction did not converge after {} iterations (residual {})",
                iterations,
                residual
            );
            Err(CalculationError::ConvergenceFailure {
                iterations,
                residual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_loss_of_one_meter_per_second() {
        assert!((velocity_head_loss(1.0) - 1.5 / 19.64).abs() < 1e-15);
        assert_eq!(velocity_head_loss(0.0), 0.0);
    }

    #[test]
    fn aggregate_residual_can_hide_opposite_errors() {
        let current = [0.1, 0.2];
        let candidate = [0.2, 0.1];
        assert!(ConvergenceCriterion::Aggregate.residual(&current, &candidate) < 1e-15);
        assert!((ConvergenceCriterion::PerSample.residual(&current, &candidate) - 0.1).abs() < 1e-15);
    }

    #[test]
    fn residual_skips_gaps() {
        let current = [0.1, f64::NAN];
        let candidate = [0.1, 0.3];
        assert_eq!(ConvergenceCriterion::Aggregate.residual(&current, &candidate), 0.0);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: HeadLossOptions =
            serde_json::from_str(r#"{ "criterion": "per_sample" }"#).unwrap();
        assert_eq!(options.criterion, ConvergenceCriterion::PerSample);
        assert_eq!(options.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(options.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn rejects_zero_iterations() {
        let options = HeadLossOptions {
            max_iterations: 0,
            ..HeadLossOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
