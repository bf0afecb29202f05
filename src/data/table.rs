//! Accident Table
//! Immutable wrapper around the cleaned accident `DataFrame`.

use crate::schema::Field;
use polars::prelude::*;
use std::collections::BTreeSet;

/// The cleaned accident records.
///
/// Every operation on a table produces a new table; the wrapped frame is never
/// modified after construction.
#[derive(Debug, Clone)]
pub struct AccidentTable {
    df: DataFrame,
}

impl Default for AccidentTable {
    /// No records, but every cleaned column with its type.
    fn default() -> Self {
        let columns: Vec<Column> = Field::RAW
            .iter()
            .chain(Field::DERIVED.iter())
            .map(|f| Column::new_empty(f.label().into(), &f.dtype()))
            .collect();
        Self {
            df: DataFrame::new(columns).unwrap_or_default(),
        }
    }
}

impl AccidentTable {
    pub(crate) fn from_frame(df: DataFrame) -> Self {
        Self { df }
    }

    /// Get a reference to the underlying DataFrame.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Lazy view over a copy of the frame (column buffers are shared).
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    /// Number of accident records.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Sorted, de-duplicated, non-null values of a column, rendered as text.
    pub fn distinct_values(&self, field: Field) -> Vec<String> {
        self.df
            .column(field.label())
            .ok()
            .and_then(|col| col.cast(&DataType::String).ok())
            .map(|col| {
                col.str()
                    .map(|ca| {
                        ca.into_iter()
                            .flatten()
                            .map(str::to_string)
                            .collect::<BTreeSet<_>>()
                    })
                    .unwrap_or_default()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct calendar months present.
    pub fn distinct_months(&self) -> usize {
        self.df
            .column(Field::Month.label())
            .ok()
            .and_then(|col| col.i32().ok().map(|ca| ca.into_iter().flatten().collect::<BTreeSet<_>>()))
            .map(|months| months.len())
            .unwrap_or(0)
    }
}
