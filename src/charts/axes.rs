//! Chart Axis Selections
//! Closed sets of the fields a chart may be drawn against, and which of them make sense for a selection.

use crate::data::{AccidentTable, FilterCriteria};
use crate::schema::Field;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity summed on the y-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Measure {
    Accidents,
    Injured,
    Killed,
}

impl Measure {
    pub const ALL: [Measure; 3] = [Measure::Accidents, Measure::Injured, Measure::Killed];

    pub const fn field(self) -> Field {
        match self {
            Measure::Accidents => Field::NumAccidents,
            Measure::Injured => Field::PersonsInjured,
            Measure::Killed => Field::PersonsKilled,
        }
    }
}

/// X-axis of the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum TimeAxis {
    CrashDate,
    HourOfDay,
    DayOfWeek,
    Month,
}

impl TimeAxis {
    pub const ALL: [TimeAxis; 4] = [
        TimeAxis::CrashDate,
        TimeAxis::HourOfDay,
        TimeAxis::DayOfWeek,
        TimeAxis::Month,
    ];

    pub const fn field(self) -> Field {
        match self {
            TimeAxis::CrashDate => Field::CrashDate,
            TimeAxis::HourOfDay => Field::HourOfDay,
            TimeAxis::DayOfWeek => Field::DayOfWeek,
            TimeAxis::Month => Field::Month,
        }
    }
}

/// Colour split of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Legend {
    Area,
    Severity,
}

impl Legend {
    pub const fn field(self) -> Field {
        match self {
            Legend::Area => Field::Borough,
            Legend::Severity => Field::Severity,
        }
    }
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Legend::Area => f.write_str("Area"),
            Legend::Severity => f.write_str("Severity"),
        }
    }
}

/// Which vehicle's contributing factor to rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FactorField {
    Vehicle1,
    Vehicle2,
}

impl FactorField {
    pub const fn field(self) -> Field {
        match self {
            FactorField::Vehicle1 => Field::Vehicle1Factor,
            FactorField::Vehicle2 => Field::Vehicle2Factor,
        }
    }
}

/// X-axis choices worth offering for the current selection.
///
/// Day of week is pointless with a single weekday selected, month with a
/// selection spanning one month.
pub fn time_axis_options(criteria: &FilterCriteria, filtered: &AccidentTable) -> Vec<TimeAxis> {
    TimeAxis::ALL
        .into_iter()
        .filter(|axis| match axis {
            TimeAxis::DayOfWeek => criteria.weekdays.len() != 1,
            TimeAxis::Month => filtered.distinct_months() != 1,
            _ => true,
        })
        .collect()
}

/// Legend choices for the time-series chart; `None` is "No Legend".
pub fn legend_options(criteria: &FilterCriteria) -> Vec<Option<Legend>> {
    let mut options = vec![Some(Legend::Area), Some(Legend::Severity), None];
    if criteria.areas.len() == 1 {
        options = vec![Some(Legend::Severity), None];
    }
    if criteria.severities.len() == 1 {
        options = vec![None, Some(Legend::Area)];
    }
    options
}
