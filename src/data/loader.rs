//! CSV Data Loader Module
//! Reads the raw accident CSV with Polars, normalises headers and validates the schema.

use super::processor::{DataProcessor, MalformedRows, ProcessorError};
use super::table::AccidentTable;
use crate::schema::{title_case, Field};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error(transparent)]
    Processing(#[from] ProcessorError),
}

/// Read the raw CSV, keeping only the required columns in their fixed order.
///
/// Every column is read as text; typing happens in the cleaning pass.
pub fn read_raw(path: &Path) -> Result<DataFrame, LoadError> {
    if !path.is_file() {
        return Err(LoadError::MissingFile(path.to_path_buf()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    normalize_columns(df)
}

/// Title-case every header and select [`Field::RAW`].
///
/// Header matching is therefore case-insensitive on the source names.
pub fn normalize_columns(mut df: DataFrame) -> Result<DataFrame, LoadError> {
    let titled: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| title_case(name.as_str().trim()))
        .collect();
    df.set_column_names(titled.iter().map(String::as_str))?;

    let missing: Vec<String> = Field::RAW
        .iter()
        .filter(|field| !titled.iter().any(|name| name == field.label()))
        .map(|field| field.label().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema { missing });
    }

    Ok(df.select(Field::RAW.map(Field::label))?)
}

/// Read and clean the accident file in one pass.
pub fn load_table(path: &Path, policy: MalformedRows) -> Result<AccidentTable, LoadError> {
    let start = Instant::now();
    let raw = read_raw(path)?;
    let raw_rows = raw.height();
    let cleaned = DataProcessor::clean(&raw, policy)?;

    info!(
        "Loaded {} of {} accident rows from {} in {:.2?}",
        cleaned.height(),
        raw_rows,
        path.display(),
        start.elapsed()
    );
    Ok(AccidentTable::from_frame(cleaned))
}
