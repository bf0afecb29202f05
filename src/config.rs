//! Dashboard Configuration
//! File-backed settings: data source, export naming, cleaning policy and dataset bounds.

use crate::charts::DEFAULT_TOP_N;
use crate::data::{DateRange, MalformedRows};
use crate::schema::{dataset_end, dataset_start};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("min_date {min} is after max_date {max}")]
    InvalidRange { min: NaiveDate, max: NaiveDate },
}

/// User settings for a dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Export file stem; the download is `<dataset_name>.xlsx`.
    pub dataset_name: String,
    pub sheet_name: String,
    pub malformed_rows: MalformedRows,
    pub top_n: usize,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("NYC Accidents 2020.csv"),
            dataset_name: "NYCAccidents".to_string(),
            sheet_name: "NYC Accidents Report".to_string(),
            malformed_rows: MalformedRows::default(),
            top_n: DEFAULT_TOP_N,
            min_date: dataset_start(),
            max_date: dataset_end(),
        }
    }
}

impl DashboardConfig {
    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_date > self.max_date {
            return Err(ConfigError::InvalidRange {
                min: self.min_date,
                max: self.max_date,
            });
        }
        Ok(())
    }

    /// Date window covering the configured dataset bounds.
    pub fn full_range(&self) -> DateRange {
        DateRange::from_dates(self.min_date, self.max_date)
    }

    /// Date window for a picker selection, clamped to the dataset bounds.
    ///
    /// A partial or reversed selection gives the full configured span.
    pub fn date_range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
        let (Some(start), Some(end)) = (start, end) else {
            return self.full_range();
        };
        let start = start.max(self.min_date);
        let end = end.min(self.max_date);
        if start > end {
            return self.full_range();
        }
        DateRange::from_dates(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        assert_eq!(DashboardConfig::from_json("{}").unwrap(), DashboardConfig::default());
    }

    #[test]
    fn partial_json_overrides_selected_keys() {
        let config = DashboardConfig::from_json(
            r#"{"data_path": "data/crashes.csv", "malformed_rows": "skip", "top_n": 5}"#,
        )
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/crashes.csv"));
        assert_eq!(config.malformed_rows, MalformedRows::Skip);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.sheet_name, "NYC Accidents Report");
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let err = DashboardConfig::from_json(r#"{"min_date": "2020-09-01", "max_date": "2020-01-01"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn selections_are_clamped_to_bounds() {
        let config = DashboardConfig::default();
        let early = NaiveDate::from_ymd_opt(2019, 6, 1).unwrap();
        let mid = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        let range = config.date_range(Some(early), Some(mid));
        assert_eq!(range, DateRange::from_dates(dataset_start(), mid));
        assert_eq!(config.date_range(None, None), DateRange::default());
    }

    #[test]
    fn partial_or_reversed_selection_gives_full_span() {
        let config = DashboardConfig::from_json(r#"{"min_date": "2020-02-01", "max_date": "2020-06-30"}"#)
            .unwrap();
        let may = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let march = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        assert_eq!(config.date_range(Some(may), None), config.full_range());
        assert_eq!(config.date_range(None, Some(may)), config.full_range());
        assert_eq!(config.date_range(Some(may), Some(march)), config.full_range());
        // Both bounds outside the configured span
        let autumn = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        assert_eq!(config.date_range(Some(autumn), Some(autumn)), config.full_range());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = DashboardConfig::from_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
