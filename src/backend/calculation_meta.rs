use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calculations::calculator::CalculationError;
use crate::calculations::overfall_calculator::WeirParameters;
use crate::calculations::pipe_flow_calculator::PipeParameters;
use crate::calculations::units::Unit;
use crate::utils::parsing::parse_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalcType {
    #[serde(rename = "overfall")]
    Overfall,
    #[serde(rename = "rorberakning")]
    PipeFlow,
}

impl CalcType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalcType::Overfall => "overfall",
            CalcType::PipeFlow => "rorberakning",
        }
    }
}

impl fmt::Display for CalcType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalculationParameters {
    Overfall(WeirParameters),
    PipeFlow(PipeParameters),
}

impl CalculationParameters {
    pub fn calc_type(&self) -> CalcType {
        match self {
            CalculationParameters::Overfall(_) => CalcType::Overfall,
            CalculationParameters::PipeFlow(_) => CalcType::PipeFlow,
        }
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        match self {
            CalculationParameters::Overfall(params) => params.validate(),
            CalculationParameters::PipeFlow(params) => params.validate(),
        }
    }

    /// Parameters as stored next to the series, in external units:
    /// `(height_p, width_b)` or `(slope, diameter, roughness)`.
    pub fn parameter_tuple(&self) -> Vec<f64> {
        match self {
            CalculationParameters::Overfall(p) => vec![p.height_p, p.width_b],
            CalculationParameters::PipeFlow(p) => vec![p.slope, p.diameter, p.roughness],
        }
    }

    /// Builds parameters from form input, accepting decimal commas.
    pub fn parse(calc_type: CalcType, fields: &[&str]) -> Result<Self, CalculationError> {
        let values = fields
            .iter()
            .map(|field| parse_decimal(field))
            .collect::<Result<Vec<f64>, _>>()?;

        let params = match (calc_type, values.as_slice()) {
            (CalcType::Overfall, &[height_p, width_b]) => {
                CalculationParameters::Overfall(WeirParameters { height_p, width_b })
            }
            (CalcType::PipeFlow, &[slope, diameter, roughness]) => {
                CalculationParameters::PipeFlow(PipeParameters {
                    slope,
                    diameter,
                    roughness,
                })
            }
            (calc_type, values) => {
                return Err(CalculationError::invalid(format!(
                    "Wrong number of parameters for {}: got {}",
                    calc_type,
                    values.len()
                )))
            }
        };
        params.validate()?;
        Ok(params)
    }
}

/// Everything stored about a calculation apart from its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationMetadata {
    pub unique_id: String,
    pub name: String,
    pub original_signal_id: String,
    pub calc_type: CalcType,
    pub unit: Unit,
    pub parameters: CalculationParameters,
}

impl CalculationMetadata {
    pub fn new(
        unique_id: &str,
        name: &str,
        original_signal_id: &str,
        unit: Unit,
        parameters: CalculationParameters,
    ) -> Result<Self, CalculationError> {
        let mut metadata = CalculationMetadata {
            unique_id: unique_id.trim().to_string(),
            name: name.trim().to_string(),
            original_signal_id: original_signal_id.trim().to_string(),
            calc_type: parameters.calc_type(),
            unit,
            parameters,
        };
        metadata.finalize();
        metadata.validate()?;
        Ok(metadata)
    }

    /// An empty display name falls back to the unique id.
    pub fn finalize(&mut self) {
        if self.name.is_empty() {
            self.name = self.unique_id.clone();
        }
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        if self.unique_id.trim().is_empty() {
            return Err(CalculationError::invalid("Unique id must not be empty"));
        }
        if self.original_signal_id.trim().is_empty() {
            return Err(CalculationError::invalid("Original signal id must not be empty"));
        }
        if self.calc_type != self.parameters.calc_type() {
            return Err(CalculationError::invalid(format!(
                "Calculation type {} does not match {} parameters",
                self.calc_type,
                self.parameters.calc_type()
            )));
        }
        self.parameters.validate()
    }
}
