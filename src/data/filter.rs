//! Filter Pipeline
//! Applies the sidebar selections (dates, areas, severities, weekdays, hours) to the accident table.

use super::table::AccidentTable;
use crate::schema::{dataset_end, dataset_start, title_case, DayOfWeek, Field, Severity};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid hour range {0}")]
    InvalidHourRange(String),
}

/// Inclusive crash datetime window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Window from the start of `start` to the last millisecond of `end`.
    ///
    /// A reversed pair falls back to the full dataset span.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self::default();
        }
        let last_instant = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(last_instant),
        }
    }

    fn bound_millis(&self) -> (i64, i64) {
        (
            self.start.and_utc().timestamp_millis(),
            self.end.and_utc().timestamp_millis(),
        )
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::from_dates(dataset_start(), dataset_end())
    }
}

/// Inclusive hour-of-day window within 0..=23.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Result<Self, FilterError> {
        if start > end || end > 23 {
            return Err(FilterError::InvalidHourRange(format!("{start}-{end}")));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }
}

impl Default for HourRange {
    fn default() -> Self {
        Self { start: 0, end: 23 }
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for HourRange {
    type Err = FilterError;

    /// Parses `START-END`, e.g. `7-19`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FilterError::InvalidHourRange(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = start.trim().parse().map_err(|_| invalid())?;
        let end = end.trim().parse().map_err(|_| invalid())?;
        HourRange::new(start, end)
    }
}

/// The user's current selections. Empty sets select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_range: DateRange,
    pub areas: BTreeSet<String>,
    pub severities: BTreeSet<Severity>,
    pub weekdays: BTreeSet<DayOfWeek>,
    pub hour_range: HourRange,
}

impl FilterCriteria {
    /// Caption lines describing the date and area selection.
    pub fn describe(&self) -> Vec<String> {
        let areas: Vec<String> = self
            .areas
            .iter()
            .map(|area| title_case(area))
            .collect();
        vec![
            format!(
                "Date Range: {} - {}",
                self.date_range.start.format("%d%b%y"),
                self.date_range.end.format("%d%b%y")
            ),
            format!("Areas: {}", areas.join(", ")),
        ]
    }

    /// Single predicate equivalent to all active selections.
    fn predicate(&self) -> Expr {
        let (start, end) = self.date_range.bound_millis();
        let datetime = || col(Field::Datetime.label());
        let hour = || col(Field::HourOfDay.label());

        let mut expr = datetime()
            .gt_eq(datetime_lit(start))
            .and(datetime().lt_eq(datetime_lit(end)));

        let memberships = [
            any_of(Field::Borough, self.areas.iter().map(String::as_str)),
            any_of(Field::Severity, self.severities.iter().map(|s| s.label())),
            any_of(Field::DayOfWeek, self.weekdays.iter().map(|d| d.label())),
        ];
        for membership in memberships.into_iter().flatten() {
            expr = expr.and(membership);
        }

        expr.and(hour().gt_eq(lit(self.hour_range.start as i32)))
            .and(hour().lt_eq(lit(self.hour_range.end as i32)))
    }
}

fn datetime_lit(millis: i64) -> Expr {
    lit(millis).cast(DataType::Datetime(TimeUnit::Milliseconds, None))
}

/// `field == v1 OR field == v2 ...`, or `None` when there are no values.
pub(crate) fn any_of<'a>(field: Field, values: impl IntoIterator<Item = &'a str>) -> Option<Expr> {
    values
        .into_iter()
        .map(|value| col(field.label()).eq(lit(value)))
        .reduce(|acc, next| acc.or(next))
}

/// Rows passing every active selection. The input table is left untouched.
pub fn filter(table: &AccidentTable, criteria: &FilterCriteria) -> Result<AccidentTable, FilterError> {
    let filtered = table.lazy().filter(criteria.predicate()).collect()?;
    debug!("Filter kept {} of {} rows", filtered.height(), table.height());
    Ok(AccidentTable::from_frame(filtered))
}
