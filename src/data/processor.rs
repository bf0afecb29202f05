//! Data Processor Module
//! Derives the computed accident columns (datetime, weekday, hour, month, severity) from the raw table.

use crate::schema::{DayOfWeek, Field, Severity};
use chrono::{Datelike, NaiveDateTime, Timelike};
use log::{debug, warn};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },
    #[error("{0} is not a derived column")]
    NotDerived(Field),
}

/// What to do with a row whose date, time or casualty counts cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRows {
    /// Abort the load on the first bad row.
    #[default]
    Fail,
    /// Drop bad rows and report how many were dropped.
    Skip,
}

/// Accepted layouts of `"<crash date> <crash time>"`.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Per-row values parsed from the raw text.
#[derive(Debug, Clone, Copy)]
struct ParsedRow {
    datetime: NaiveDateTime,
    injured: i64,
    killed: i64,
}

/// Combine the crash date and crash time text and parse the result.
pub fn parse_crash_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date.trim(), time.trim());
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&combined, fmt).ok())
}

/// Parse a casualty count. Missing counts are zero.
fn parse_count(value: Option<&str>) -> Result<i64, String> {
    let text = match value.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(text) => text,
    };
    let count = match text.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
            _ => return Err(format!("invalid count '{text}'")),
        },
    };
    if count < 0 {
        return Err(format!("negative count {count}"));
    }
    Ok(count)
}

/// Handles the one-time cleaning pass over the raw accident table.
pub struct DataProcessor;

impl DataProcessor {
    /// Build the cleaned table from the raw, title-cased table.
    ///
    /// Output columns: the raw columns (latitude/longitude as floats, casualty
    /// counts as integers) followed by the derived columns in
    /// [`Field::DERIVED`] order.
    pub fn clean(raw: &DataFrame, policy: MalformedRows) -> Result<DataFrame, ProcessorError> {
        let date_col = Self::text_column(raw, Field::CrashDate)?;
        let time_col = Self::text_column(raw, Field::CrashTime)?;
        let injured_col = Self::text_column(raw, Field::PersonsInjured)?;
        let killed_col = Self::text_column(raw, Field::PersonsKilled)?;

        let inputs: Vec<(Option<&str>, Option<&str>, Option<&str>, Option<&str>)> = date_col
            .str()?
            .into_iter()
            .zip(time_col.str()?.into_iter())
            .zip(injured_col.str()?.into_iter())
            .zip(killed_col.str()?.into_iter())
            .map(|(((d, t), i), k)| (d, t, i, k))
            .collect();

        // Parsing is independent per row
        let parsed: Vec<Result<ParsedRow, String>> = inputs
            .par_iter()
            .map(|&(date, time, injured, killed)| Self::parse_row(date, time, injured, killed))
            .collect();

        let mut keep = Vec::with_capacity(parsed.len());
        let mut rows = Vec::with_capacity(parsed.len());
        for (row, result) in parsed.into_iter().enumerate() {
            match (result, policy) {
                (Ok(parsed_row), _) => {
                    keep.push(true);
                    rows.push(parsed_row);
                }
                (Err(reason), MalformedRows::Fail) => {
                    return Err(ProcessorError::MalformedRow { row, reason });
                }
                (Err(reason), MalformedRows::Skip) => {
                    debug!("Skipping row {row}: {reason}");
                    keep.push(false);
                }
            }
        }

        let mut df = raw.select(Field::RAW.map(Field::label))?;
        let skipped = keep.len() - rows.len();
        if skipped > 0 {
            warn!("Skipped {} malformed rows out of {}", skipped, keep.len());
            let mask = Series::new("keep".into(), keep);
            df = df.filter(mask.bool()?)?;
        }

        for field in [Field::Latitude, Field::Longitude] {
            let coords = df.column(field.label())?.cast(&DataType::Float64)?;
            df.with_column(coords)?;
        }
        df.with_column(Column::new(
            Field::PersonsInjured.label().into(),
            rows.iter().map(|r| r.injured).collect::<Vec<i64>>(),
        ))?;
        df.with_column(Column::new(
            Field::PersonsKilled.label().into(),
            rows.iter().map(|r| r.killed).collect::<Vec<i64>>(),
        ))?;

        for field in Field::DERIVED {
            df.with_column(Self::derived_column(field, &rows)?)?;
        }

        debug!("Cleaned {} rows into {} columns", df.height(), df.width());
        Ok(df)
    }

    fn text_column(raw: &DataFrame, field: Field) -> Result<Column, ProcessorError> {
        Ok(raw.column(field.label())?.cast(&DataType::String)?)
    }

    fn parse_row(
        date: Option<&str>,
        time: Option<&str>,
        injured: Option<&str>,
        killed: Option<&str>,
    ) -> Result<ParsedRow, String> {
        let (Some(date), Some(time)) = (date, time) else {
            return Err("missing crash date or time".to_string());
        };
        let datetime = parse_crash_datetime(date, time)
            .ok_or_else(|| format!("unparseable timestamp '{date} {time}'"))?;
        Ok(ParsedRow {
            datetime,
            injured: parse_count(injured)?,
            killed: parse_count(killed)?,
        })
    }

    fn derived_column(field: Field, rows: &[ParsedRow]) -> Result<Column, ProcessorError> {
        let name: PlSmallStr = field.label().into();
        let column = match field {
            Field::NumAccidents => Column::new(name, vec![1i64; rows.len()]),
            Field::Datetime => {
                let millis: Vec<i64> = rows
                    .iter()
                    .map(|r| r.datetime.and_utc().timestamp_millis())
                    .collect();
                Column::new(name, millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            }
            Field::DayOfWeek => Column::new(
                name,
                rows.iter()
                    .map(|r| DayOfWeek::from_chrono(r.datetime.weekday()).label())
                    .collect::<Vec<&str>>(),
            ),
            Field::HourOfDay => Column::new(
                name,
                rows.iter()
                    .map(|r| r.datetime.hour() as i32)
                    .collect::<Vec<i32>>(),
            ),
            Field::Month => Column::new(
                name,
                rows.iter()
                    .map(|r| r.datetime.month() as i32)
                    .collect::<Vec<i32>>(),
            ),
            Field::Fatal => Column::new(
                name,
                rows.iter().map(|r| r.killed > 0).collect::<Vec<bool>>(),
            ),
            Field::Injurious => Column::new(
                name,
                rows.iter().map(|r| r.injured > 0).collect::<Vec<bool>>(),
            ),
            Field::Severity => Column::new(
                name,
                rows.iter()
                    .map(|r| Severity::classify(r.injured, r.killed).label())
                    .collect::<Vec<&str>>(),
            ),
            raw => return Err(ProcessorError::NotDerived(raw)),
        };
        Ok(column)
    }
}
