use serde::{Deserialize, Serialize};

use super::calculator::{require_positive, CalculationError, DegeneracyPolicy, FlowCalculator};
use super::units::Unit;
use crate::series::time_series::{FlowSeries, LevelSeries, Quantity};

/// Gravitational acceleration used by the weir formula, m/s².
pub const WEIR_GRAVITY: f64 = 9.81;
/// Below this weir height or width the formula is outside its calibrated range.
pub const RECOMMENDED_MIN_DIMENSION: f64 = 0.3;
/// Heads over the crest above this are outside the calibrated range.
pub const RECOMMENDED_MAX_HEAD: f64 = 0.75;

/// Sharp-crested weir geometry, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeirParameters {
    pub height_p: f64,
    pub width_b: f64,
}

impl WeirParameters {
    pub fn new(height_p: f64, width_b: f64) -> Result<Self, CalculationError> {
        let params = WeirParameters { height_p, width_b };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), CalculationError> {
        require_positive("Weir height", self.height_p)?;
        require_positive("Weir width", self.width_b)?;
        Ok(())
    }
}

/// Conditions that do not stop a weir calculation but make its result less trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeirAdvisory {
    HeadExceedsWeirHeight,
    NarrowWeir,
    LowWeir,
    HeadAboveRange,
}

impl WeirAdvisory {
    pub fn message(&self) -> &'static str {
        match self {
            WeirAdvisory::HeadExceedsWeirHeight => {
                "Head over the crest exceeds the weir height in at least one sample"
            }
            WeirAdvisory::NarrowWeir => "Weir width is below 0.3 m, the formula expects at least 0.3 m",
            WeirAdvisory::LowWeir => "Weir height is below 0.3 m, the formula expects at least 0.3 m",
            WeirAdvisory::HeadAboveRange => {
                "Head over the crest exceeds 0.75 m, the result may be inaccurate"
            }
        }
    }
}

pub struct OverfallCalculator {
    params: WeirParameters,
    sqrt_two_g: f64,
}

impl OverfallCalculator {
    pub fn new(params: WeirParameters) -> Result<Self, CalculationError> {
        params.validate()?;
        Ok(OverfallCalculator {
            params,
            sqrt_two_g: (2.0 * WEIR_GRAVITY).sqrt(),
        })
    }

    /// Water height over the crest. No flow below it, so negative heads become 0.
    pub fn head(&self, level: f64) -> f64 {
        let h = level - self.params.height_p;
        if h < 0.0 {
            0.0
        } else {
            h
        }
    }

    pub fn discharge_coefficient(&self, head: f64) -> f64 {
        0.602 + 0.083 * head / self.params.height_p
    }

    pub fn advisories(&self, level: &LevelSeries) -> Vec<WeirAdvisory> {
        let heads: Vec<f64> = level.values().iter().map(|&l| self.head(l)).collect();
        let mut advisories = Vec::new();

        if heads.iter().any(|&h| h / self.params.height_p > 1.0) {
            advisories.push(WeirAdvisory::HeadExceedsWeirHeight);
        }
        if self.params.width_b < RECOMMENDED_MIN_DIMENSION {
            advisories.push(WeirAdvisory::NarrowWeir);
        }
        if self.params.height_p < RECOMMENDED_MIN_DIMENSION {
            advisories.push(WeirAdvisory::LowWeir);
        }
        if heads.iter().any(|&h| h > RECOMMENDED_MAX_HEAD) {
            advisories.push(WeirAdvisory::HeadAboveRange);
        }
        advisories
    }
}

impl FlowCalculator for OverfallCalculator {
    fn perform_calculation(&self, level: f64) -> f64 {
        let h = self.head(level);
        self.discharge_coefficient(h) * 2.0 / 3.0
            * self.sqrt_two_g
            * self.params.width_b
            * h.powf(1.5)
    }

    fn degeneracy_policy(&self) -> DegeneracyPolicy {
        DegeneracyPolicy::ZeroFill
    }
}

/// Flow over a sharp-crested weir for every level sample.
///
/// Out-of-range conditions are logged as warnings; only invalid weir dimensions fail.
pub fn overfall(
    level: &LevelSeries,
    height_p: f64,
    width_b: f64,
    unit: Unit,
) -> Result<FlowSeries, CalculationError> {
    let calculator = OverfallCalculator::new(WeirParameters { height_p, width_b })?;
    log::info!(
        "Running overfall calculation: {} samples, weir height {} m, weir width {} m",
        level.len(),
        height_p,
        width_b
    );

    for advisory in calculator.advisories(level) {
        log::warn!("{}", advisory.message());
    }

    let flow = FlowSeries::from_calculator(&calculator, level, Quantity::Flow(unit));
    log::info!("Overfall calculation completed");
    Ok(flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator(height_p: f64, width_b: f64) -> OverfallCalculator {
        OverfallCalculator::new(WeirParameters { height_p, width_b }).unwrap()
    }

    #[test]
    fn head_is_clamped_at_the_crest() {
        let calc = calculator(0.3, 0.4);
        assert_eq!(calc.head(0.1), 0.0);
        assert!((calc.head(0.5) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn nan_level_is_zero_filled() {
        let calc = calculator(0.3, 0.4);
        assert!(calc.perform_calculation(f64::NAN).is_nan());
        assert_eq!(calc.resolve(f64::NAN), Some(0.0));
    }

    #[test]
    fn advisories_for_small_weir_and_high_head() {
        let calc = calculator(0.2, 0.25);
        let level = LevelSeries::from_values(vec![0.1, 1.2]);
        let advisories = calc.advisories(&level);
        assert!(advisories.contains(&WeirAdvisory::HeadExceedsWeirHeight));
        assert!(advisories.contains(&WeirAdvisory::NarrowWeir));
        assert!(advisories.contains(&WeirAdvisory::LowWeir));
        assert!(advisories.contains(&WeirAdvisory::HeadAboveRange));
    }

    #[test]
    fn no_advisories_inside_recommended_range() {
        let calc = calculator(0.5, 0.6);
        let level = LevelSeries::from_values(vec![0.4, 0.7, 0.9]);
        assert!(calc.advisories(&level).is_empty());
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(WeirParameters::new(0.0, 0.4).is_err());
        assert!(WeirParameters::new(0.3, -1.0).is_err());
        assert!(WeirParameters::new(f64::NAN, 0.4).is_err());
    }
}
