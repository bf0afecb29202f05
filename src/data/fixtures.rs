//! Test fixtures: raw accident rows built field by field.

use super::processor::{DataProcessor, MalformedRows};
use super::table::AccidentTable;
use crate::schema::Field;
use polars::prelude::*;

/// One raw source row; every value is text, as read from the CSV.
#[derive(Debug, Clone)]
pub(crate) struct RawRow {
    date: &'static str,
    time: &'static str,
    borough: Option<&'static str>,
    latitude: Option<&'static str>,
    longitude: Option<&'static str>,
    injured: &'static str,
    killed: &'static str,
    factor1: Option<&'static str>,
    factor2: Option<&'static str>,
}

/// A safe Wednesday-noon accident in Brooklyn with no location and no cause.
pub(crate) fn row() -> RawRow {
    RawRow {
        date: "2020-03-04",
        time: "12:00:00",
        borough: Some("BROOKLYN"),
        latitude: None,
        longitude: None,
        injured: "0",
        killed: "0",
        factor1: None,
        factor2: None,
    }
}

impl RawRow {
    pub(crate) fn date(mut self, date: &'static str) -> Self {
        self.date = date;
        self
    }

    pub(crate) fn time(mut self, time: &'static str) -> Self {
        self.time = time;
        self
    }

    pub(crate) fn borough(mut self, borough: Option<&'static str>) -> Self {
        self.borough = borough;
        self
    }

    pub(crate) fn at(mut self, latitude: &'static str, longitude: &'static str) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub(crate) fn injured(mut self, injured: &'static str) -> Self {
        self.injured = injured;
        self
    }

    pub(crate) fn killed(mut self, killed: &'static str) -> Self {
        self.killed = killed;
        self
    }

    pub(crate) fn factor1(mut self, factor: Option<&'static str>) -> Self {
        self.factor1 = factor;
        self
    }

    pub(crate) fn factor2(mut self, factor: Option<&'static str>) -> Self {
        self.factor2 = factor;
        self
    }

    fn value(&self, field: Field, index: usize) -> Option<String> {
        let text = match field {
            Field::CrashDate => Some(self.date),
            Field::CrashTime => Some(self.time),
            Field::Borough => self.borough,
            Field::Latitude => self.latitude,
            Field::Longitude => self.longitude,
            Field::PersonsInjured => Some(self.injured),
            Field::PersonsKilled => Some(self.killed),
            Field::Vehicle1Factor => self.factor1,
            Field::Vehicle2Factor => self.factor2,
            Field::Vehicle1Type => Some("Sedan"),
            Field::CollisionId => return Some(format!("{}", 4_000_000 + index)),
            _ => None,
        };
        text.map(str::to_string)
    }
}

/// Raw title-cased frame with the [`Field::RAW`] columns.
pub(crate) fn raw_frame(rows: &[RawRow]) -> DataFrame {
    let columns: Vec<Column> = Field::RAW
        .iter()
        .map(|field| {
            let values: Vec<Option<String>> = rows
                .iter()
                .enumerate()
                .map(|(index, row)| row.value(*field, index))
                .collect();
            Column::new(field.label().into(), values)
        })
        .collect();
    DataFrame::new(columns).expect("fixture frame")
}

/// Cleaned table built from raw rows.
pub(crate) fn table(rows: &[RawRow]) -> AccidentTable {
    let cleaned = DataProcessor::clean(&raw_frame(rows), MalformedRows::Fail).expect("fixture rows");
    AccidentTable::from_frame(cleaned)
}
