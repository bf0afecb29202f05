//! Statistics Calculator Module
//! Headline counts for the current selection and the map midpoint.

use crate::data::AccidentTable;
use crate::schema::{Field, Severity};
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::{Data, Median};

/// Headline metrics shown above the charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Total vehicular collisions.
    pub total: usize,
    /// Collisions with injuries but no deaths.
    pub injurious: usize,
    pub fatal: usize,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Handles the descriptive statistics used by the dashboard.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Count collisions by severity.
    pub fn summarize(table: &AccidentTable) -> Result<Summary, PolarsError> {
        if table.is_empty() {
            return Ok(Summary::default());
        }

        let severity = table.frame().column(Field::Severity.label())?.str()?;
        let count = |wanted: Severity| {
            severity
                .into_iter()
                .filter(|value| *value == Some(wanted.label()))
                .count()
        };

        Ok(Summary {
            total: table.height(),
            injurious: count(Severity::Injurious),
            fatal: count(Severity::Fatal),
        })
    }

    /// Median of the given values, `None` when there are none.
    pub fn median(values: Vec<f64>) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(Data::new(values).median())
    }

    /// Median of the non-null values of a float column.
    pub fn column_median(df: &DataFrame, field: Field) -> Result<Option<f64>, PolarsError> {
        let values: Vec<f64> = df
            .column(field.label())?
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect();
        Ok(Self::median(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{row, table};

    #[test]
    fn summary_counts_by_severity() {
        let t = table(&[
            row().killed("1"),
            row().injured("2"),
            row().injured("1"),
            row(),
        ]);
        let summary = StatsCalculator::summarize(&t).unwrap();
        assert_eq!(
            summary,
            Summary {
                total: 4,
                injurious: 2,
                fatal: 1
            }
        );
    }

    #[test]
    fn empty_table_summarizes_to_zero() {
        let summary = StatsCalculator::summarize(&AccidentTable::default()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn median_handles_even_and_odd_counts() {
        assert_eq!(StatsCalculator::median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(StatsCalculator::median(vec![4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(StatsCalculator::median(Vec::new()), None);
    }
}
