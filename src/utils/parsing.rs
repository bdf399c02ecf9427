use crate::calculations::calculator::CalculationError;

/// Parses a number typed with either a decimal point or a decimal comma.
pub fn parse_decimal(value: &str) -> Result<f64, CalculationError> {
    let normalized = value.trim().replace(',', ".");
    let parsed = normalized
        .parse::<f64>()
        .map_err(|_| CalculationError::invalid(format!("Not a number: '{}'", value.trim())))?;
    if !parsed.is_finite() {
        return Err(CalculationError::invalid(format!("Not a number: '{}'", value.trim())));
    }
    Ok(parsed)
}
