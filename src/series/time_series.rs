use chrono::NaiveDateTime;
use polars::prelude::*;

use crate::calculations::calculator::{CalculationError, FlowCalculator};
use crate::calculations::units::Unit;

/// Water level samples in metres, optionally tied to a timestamp index.
///
/// Negative heights are kept as measured; each model clamps them itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSeries {
    index: Option<Vec<NaiveDateTime>>,
    values: Vec<f64>,
}

impl LevelSeries {
    /// Builds an indexed series. Timestamps must be strictly ascending.
    pub fn new(samples: Vec<(NaiveDateTime, f64)>) -> Result<Self, CalculationError> {
        let (index, values): (Vec<NaiveDateTime>, Vec<f64>) = samples.into_iter().unzip();
        validate_index(&index)?;
        Ok(LevelSeries {
            index: Some(index),
            values,
        })
    }

    /// A plain numeric array with no time index.
    pub fn from_values(values: Vec<f64>) -> Self {
        LevelSeries {
            index: None,
            values,
        }
    }

    pub fn from_dataframe(
        df: &DataFrame,
        time_col: &str,
        value_col: &str,
    ) -> Result<Self, CalculationError> {
        let index: Vec<NaiveDateTime> = df
            .column(time_col)?
            .datetime()?
            .as_datetime_iter()
            .map(|opt_dt| {
                opt_dt.ok_or_else(|| {
                    CalculationError::Series(format!("Null timestamp in column '{}'", time_col))
                })
            })
            .collect::<Result<_, _>>()?;

        let level_column = df.column(value_col)?.cast(&DataType::Float64)?;
        let values: Vec<f64> = level_column
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        validate_index(&index)?;
        Ok(LevelSeries {
            index: Some(index),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn index(&self) -> Option<&[NaiveDateTime]> {
        self.index.as_deref()
    }

    /// Same index, new values. Used for head-loss corrected levels.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, CalculationError> {
        if values.len() != self.values.len() {
            return Err(CalculationError::Series(format!(
                "Expected {} values, got {}",
                self.values.len(),
                values.len()
            )));
        }
        Ok(LevelSeries {
            index: self.index.clone(),
            values,
        })
    }
}

fn validate_index(index: &[NaiveDateTime]) -> Result<(), CalculationError> {
    for window in index.windows(2) {
        if let [prev, next] = window {
            if next <= prev {
                return Err(CalculationError::Series(format!(
                    "Timestamps must be strictly ascending: {} is followed by {}",
                    prev, next
                )));
            }
        }
    }
    Ok(())
}

/// What a [`FlowSeries`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Flow(Unit),
    /// Mean cross-sectional velocity in m/s.
    Velocity,
}

/// Computed samples aligned with the originating level series. `None` marks a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSeries {
    index: Option<Vec<NaiveDateTime>>,
    values: Vec<Option<f64>>,
    quantity: Quantity,
}

impl FlowSeries {
    /// Evaluates `calculator` for every level sample, resolves degenerate samples with the
    /// calculator's policy and converts flows into `quantity`'s unit exactly once.
    pub fn from_calculator<C: FlowCalculator + ?Sized>(
        calculator: &C,
        level: &LevelSeries,
        quantity: Quantity,
    ) -> Self {
        let values = level
            .values()
            .iter()
            .map(|&h| {
                calculator.resolve(h).map(|value| match quantity {
                    Quantity::Flow(unit) => unit.from_cubic_meters_per_second(value),
                    Quantity::Velocity => value,
                })
            })
            .collect();

        FlowSeries {
            index: level.index.clone(),
            values,
            quantity,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn index(&self) -> Option<&[NaiveDateTime]> {
        self.index.as_deref()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit(&self) -> Option<Unit> {
        match self.quantity {
            Quantity::Flow(unit) => Some(unit),
            Quantity::Velocity => None,
        }
    }

    /// Values with gaps skipped.
    pub fn present_values(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Timestamp/value pairs. Empty for an index-less series.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, Option<f64>)> + '_ {
        self.index
            .iter()
            .flatten()
            .copied()
            .zip(self.values.iter().copied())
    }

    pub fn column_name(&self) -> String {
        match self.quantity {
            Quantity::Flow(unit) => format!("Flow ({})", unit),
            Quantity::Velocity => "Velocity (m/s)".to_string(),
        }
    }

    /// Gaps become nulls. Without an index only the value column is produced.
    pub fn to_dataframe(&self, time_col: &str) -> Result<DataFrame, CalculationError> {
        let mut series_vec: Vec<Series> = Vec::new();
        if let Some(index) = &self.index {
            series_vec.push(Series::new(time_col.into(), index.clone()));
        }
        series_vec.push(Series::new(
            self.column_name().as_str().into(),
            self.values.clone(),
        ));
        Ok(DataFrame::new(series_vec)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let result = LevelSeries::new(vec![(ts(1), 0.1), (ts(1), 0.2)]);
        assert!(matches!(result, Err(CalculationError::Series(_))));
    }

    #[test]
    fn rejects_descending_timestamps() {
        assert!(LevelSeries::new(vec![(ts(2), 0.1), (ts(1), 0.2)]).is_err());
    }

    #[test]
    fn with_values_keeps_index_and_checks_length() {
        let level = LevelSeries::new(vec![(ts(1), 0.1), (ts(2), 0.2)]).unwrap();
        let corrected = level.with_values(vec![0.05, 0.15]).unwrap();
        assert_eq!(corrected.index(), level.index());
        assert!(level.with_values(vec![0.0]).is_err());
    }

    #[test]
    fn dataframe_round_trip_keeps_gaps() {
        let df = DataFrame::new(vec![
            Series::new("time".into(), vec![ts(1), ts(2), ts(3)]),
            Series::new("level".into(), vec![Some(0.1), None, Some(0.3)]),
        ])
        .unwrap();
        let level = LevelSeries::from_dataframe(&df, "time", "level").unwrap();
        assert_eq!(level.len(), 3);
        assert!(level.values()[1].is_nan());

        let flow = FlowSeries {
            index: level.index.clone(),
            values: vec![Some(1.0), None, Some(3.0)],
            quantity: Quantity::Flow(Unit::LitersPerSecond),
        };
        let out = flow.to_dataframe("time").unwrap();
        assert_eq!(out.height(), 3);
        assert_eq!(out.column("Flow (l/s)").unwrap().null_count(), 1);
    }
}
