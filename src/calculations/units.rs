use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::calculator::CalculationError;

pub const LITERS_PER_CUBIC_METER: f64 = 1000.0;

/// Output unit of a flow series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "m3/s")]
    CubicMetersPerSecond,
    #[serde(rename = "l/s")]
    LitersPerSecond,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::CubicMetersPerSecond => "m3/s",
            Unit::LitersPerSecond => "l/s",
        }
    }

    /// Converts a value computed in m³/s into this unit.
    pub fn from_cubic_meters_per_second(&self, q_m3s: f64) -> f64 {
        match self {
            Unit::CubicMetersPerSecond => q_m3s,
            Unit::LitersPerSecond => to_liters_per_second(q_m3s),
        }
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::CubicMetersPerSecond
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m3/s" | "m³/s" => Ok(Unit::CubicMetersPerSecond),
            "l/s" | "L/s" | "L/S" => Ok(Unit::LitersPerSecond),
            other => Err(CalculationError::invalid(format!("Unknown unit: {}", other))),
        }
    }
}

pub fn to_liters_per_second(q_m3s: f64) -> f64 {
    q_m3s * LITERS_PER_CUBIC_METER
}

/// External pipe inputs arrive in millimetres and per-mille.
pub(crate) fn millimeters_to_meters(value_mm: f64) -> f64 {
    value_mm / 1000.0
}

pub(crate) fn per_mille_to_fraction(value: f64) -> f64 {
    value / 1000.0
}
