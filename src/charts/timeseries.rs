//! Time-Series Chart Data
//! Sums a measure per x-axis value (and legend value), in chart order.

use super::axes::{Legend, Measure, TimeAxis};
use super::ChartError;
use crate::data::AccidentTable;
use crate::schema::{DayOfWeek, Field};
use log::debug;
use polars::prelude::*;

const SORT_KEY: &str = "__sort_key";

/// Input of the line chart.
///
/// Columns: `[x, legend?, y]`, one row per group.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub x: TimeAxis,
    pub y: Measure,
    pub legend: Option<Legend>,
    pub frame: DataFrame,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Group by the x-axis (and legend) and sum the measure.
///
/// Rows are ordered along the x-axis: weekdays Monday to Sunday, crash
/// dates chronologically, hours and months numerically. Within one x value
/// the legend values are sorted. Rows with a null key are dropped.
pub fn build_timeseries(
    table: &AccidentTable,
    x: TimeAxis,
    y: Measure,
    legend: Option<Legend>,
) -> Result<TimeSeries, ChartError> {
    let x_name = x.field().label();
    let y_name = y.field().label();
    let legend_name = legend.map(|l| l.field().label());

    let mut keys = vec![col(x_name)];
    let mut has_keys = col(x_name).is_not_null();
    if let Some(name) = legend_name {
        keys.push(col(name));
        has_keys = has_keys.and(col(name).is_not_null());
    }

    let mut aggs = vec![col(y_name).sum()];
    if x == TimeAxis::CrashDate {
        aggs.push(col(Field::Datetime.label()).min().alias(SORT_KEY));
    }

    let mut grouped = table.lazy().filter(has_keys).group_by(keys).agg(aggs);
    if x == TimeAxis::CrashDate {
        // One key per date, so legend values sort among themselves
        grouped = grouped.with_column(col(SORT_KEY).min().over([col(x_name)]).alias(SORT_KEY));
    }
    let mut grouped = grouped.collect()?;

    // Weekday names sort alphabetically otherwise
    if x == TimeAxis::DayOfWeek {
        let order: Vec<Option<u32>> = grouped
            .column(x_name)?
            .str()?
            .into_iter()
            .map(|day| day.and_then(DayOfWeek::sort_key_of))
            .collect();
        grouped.with_column(Column::new(SORT_KEY.into(), order))?;
    }

    let mut sort_by = match x {
        TimeAxis::CrashDate | TimeAxis::DayOfWeek => vec![col(SORT_KEY)],
        TimeAxis::HourOfDay | TimeAxis::Month => vec![col(x_name)],
    };
    let mut output = vec![col(x_name)];
    if let Some(name) = legend_name {
        sort_by.push(col(name));
        output.push(col(name));
    }
    output.push(col(y_name));

    let frame = grouped
        .lazy()
        .sort_by_exprs(sort_by, SortMultipleOptions::default())
        .select(output)
        .collect()?;

    debug!("Time series over {:?}: {} points", x, frame.height());
    Ok(TimeSeries {
        x,
        y,
        legend,
        frame,
    })
}
