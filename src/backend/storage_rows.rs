use chrono::NaiveDateTime;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

use crate::backend::calculation_meta::CalculationMetadata;
use crate::calculations::calculator::CalculationError;
use crate::series::time_series::FlowSeries;

/// Rows per insert batch handed to the persistence layer.
pub const STORAGE_BATCH_SIZE: usize = 100_000;
pub const STORAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Calculation error: {0}")]
    CalculationError(#[from] CalculationError),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageRow {
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveDateTime,
    pub value: f64,
    pub unique_id: String,
}

fn serialize_time<S: serde::Serializer>(
    time: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format(STORAGE_TIME_FORMAT).to_string())
}

/// Rows for every present sample. Gaps are not stored.
pub fn to_storage_rows(
    flow: &FlowSeries,
    unique_id: &str,
) -> Result<Vec<StorageRow>, StorageError> {
    if flow.index().is_none() {
        return Err(StorageError::InvalidParameter(
            "Only series with a time index can be stored".to_string(),
        ));
    }
    if unique_id.trim().is_empty() {
        return Err(StorageError::InvalidParameter(
            "Unique id must not be empty".to_string(),
        ));
    }

    let rows: Vec<StorageRow> = flow
        .iter()
        .filter_map(|(time, value)| {
            value.map(|value| StorageRow {
                time,
                value,
                unique_id: unique_id.to_string(),
            })
        })
        .collect();

    let skipped = flow.len() - rows.len();
    if skipped > 0 {
        log::info!("Skipped {} missing samples for '{}'", skipped, unique_id);
    }
    Ok(rows)
}

pub fn storage_batches(rows: &[StorageRow], batch_size: usize) -> impl Iterator<Item = &[StorageRow]> {
    rows.chunks(batch_size.max(1))
}

pub fn write_csv<W: Write>(rows: &[StorageRow], writer: W) -> Result<(), StorageError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    log::info!("Wrote {} rows", rows.len());
    Ok(())
}

pub fn metadata_to_json(metadata: &CalculationMetadata) -> Result<String, StorageError> {
    metadata.validate()?;
    Ok(serde_json::to_string(metadata)?)
}
