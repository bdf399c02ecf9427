use serde::{Deserialize, Serialize};

use super::calculator::{
    require_finite, require_positive, CalculationError, DegeneracyPolicy, FlowCalculator,
};
use super::circular_geometry::{CircularGeometry, WettedSection};
use super::units::{millimeters_to_meters, per_mille_to_fraction, Unit};
use crate::series::time_series::{FlowSeries, LevelSeries, Quantity};

/// Gravitational acceleration used by the pipe formula, m/s².
pub const PIPE_GRAVITY: f64 = 9.81;
/// Kinematic viscosity of water, m²/s.
pub const KINEMATIC_VISCOSITY: f64 = 1.0034e-6;

/// Pipe inputs in the units technicians enter them: slope in per-mille,
/// diameter and roughness in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeParameters {
    pub slope: f64,
    pub diameter: f64,
    pub roughness: f64,
}

impl PipeParameters {
    pub fn new(slope: f64, diameter: f64, roughness: f64) -> Result<Self, CalculationError> {
        let params = PipeParameters {
            slope,
            diameter,
            roughness,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        require_finite("Slope", self.slope)?;
        require_positive("Diameter", self.diameter)?;
        require_finite("Roughness", self.roughness)?;
        if self.roughness < 0.0 {
            return Err(CalculationError::invalid(format!(
                "Roughness must not be negative, got {}",
                self.roughness
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipeOutput {
    Flow,
    /// Mean cross-sectional velocity instead of discharge.
    Velocity,
}

pub struct PipeFlowCalculator {
    geometry: CircularGeometry,
    slope: f64,
    roughness: f64,
    output: PipeOutput,
}

impl PipeFlowCalculator {
    pub fn new(params: &PipeParameters, output: PipeOutput) -> Result<Self, CalculationError> {
        params.validate()?;
        Ok(PipeFlowCalculator {
            geometry: CircularGeometry::new(millimeters_to_meters(params.diameter) / 2.0),
            slope: per_mille_to_fraction(params.slope),
            roughness: millimeters_to_meters(params.roughness),
            output,
        })
    }

    pub fn geometry(&self) -> &CircularGeometry {
        &self.geometry
    }

    /// Colebrook-White mean velocity for a wetted section; negative for a negative slope.
    fn mean_velocity(&self, section: &WettedSection) -> f64 {
        let r = section.hydraulic_radius;
        let friction_term = signed_sqrt(32.0 * PIPE_GRAVITY * r * self.slope);
        let shear_term = signed_sqrt(128.0 * PIPE_GRAVITY * r * self.slope);
        friction_term
            * (self.roughness / (14.83 * r) + 2.52 * KINEMATIC_VISCOSITY / (r * shear_term)).log10()
    }
}

impl FlowCalculator for PipeFlowCalculator {
    fn perform_calculation(&self, level: f64) -> f64 {
        if level.is_nan() {
            return f64::NAN;
        }
        // an empty pipe carries nothing; avoids the 0/0 hydraulic radius
        if level <= 0.0 {
            return 0.0;
        }

        let section = self.geometry.section(level);
        let velocity = self.mean_velocity(&section);
        match self.output {
            PipeOutput::Flow => (velocity * section.area).abs(),
            PipeOutput::Velocity => velocity.abs(),
        }
    }

    fn degeneracy_policy(&self) -> DegeneracyPolicy {
        DegeneracyPolicy::Missing
    }
}

fn signed_sqrt(value: f64) -> f64 {
    value.signum() * value.abs().sqrt()
}

/// Gravity flow through a circular pipe for every level sample.
///
/// Infinite or undefined samples are left as gaps. Velocity output is always m/s, so
/// asking for it in l/s is rejected.
pub fn pipe_flow(
    level: &LevelSeries,
    params: &PipeParameters,
    unit: Unit,
    output: PipeOutput,
) -> Result<FlowSeries, CalculationError> {
    if output == PipeOutput::Velocity && unit == Unit::LitersPerSecond {
        return Err(CalculationError::invalid(
            "Velocity output is in m/s and cannot be expressed in l/s",
        ));
    }
    let calculator = PipeFlowCalculator::new(params, output)?;
    log::info!(
        "Running pipe calculation: {} samples, slope {} per mille, diameter {} mm, roughness {} mm",
        level.len(),
        params.slope,
        params.diameter,
        params.roughness
    );

    let quantity = match output {
        PipeOutput::Flow => Quantity::Flow(unit),
        PipeOutput::Velocity => Quantity::Velocity,
    };
    let result = FlowSeries::from_calculator(&calculator, level, quantity);

    let missing = result.missing_count();
    if missing > 0 {
        log::warn!("Pipe calculation left {} undefined samples as gaps", missing);
    }
    log::info!("Pipe calculation completed");
    Ok(result)
}

/// Mean velocity (m/s) for every level sample.
pub fn pipe_velocity(
    level: &LevelSeries,
    params: &PipeParameters,
) -> Result<FlowSeries, CalculationError> {
    pipe_flow(level, params, Unit::CubicMetersPerSecond, PipeOutput::Velocity)
}
