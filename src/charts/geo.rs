//! Geospatial Chart Data
//! Coordinate-bearing accidents for density binning, plus the map centre.

use super::ChartError;
use crate::data::AccidentTable;
use crate::schema::Field;
use crate::stats::StatsCalculator;
use log::debug;
use polars::prelude::*;
use serde::Serialize;

/// Initial map zoom level.
pub const DEFAULT_ZOOM: u8 = 11;

/// Columns handed to the map renderer.
pub const GEO_COLUMNS: [Field; 6] = [
    Field::CrashDate,
    Field::CrashTime,
    Field::Latitude,
    Field::Longitude,
    Field::PersonsInjured,
    Field::PersonsKilled,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Input of the hexagon-binned map.
#[derive(Debug, Clone)]
pub struct GeoView {
    pub frame: DataFrame,
    /// Median latitude/longitude; used to centre the map, never to filter.
    pub midpoint: Option<GeoPoint>,
    pub zoom: u8,
}

impl GeoView {
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Accidents with both coordinates present, and their median position.
pub fn build_geo_subset(table: &AccidentTable) -> Result<GeoView, ChartError> {
    let latitude = Field::Latitude.label();
    let longitude = Field::Longitude.label();
    let frame = table
        .lazy()
        .filter(
            col(latitude)
                .is_not_null()
                .and(col(longitude).is_not_null())
                .and(col(latitude).is_not_nan())
                .and(col(longitude).is_not_nan()),
        )
        .select(GEO_COLUMNS.map(|f| col(f.label())))
        .collect()?;

    let midpoint = match (
        StatsCalculator::column_median(&frame, Field::Latitude)?,
        StatsCalculator::column_median(&frame, Field::Longitude)?,
    ) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    debug!(
        "Map keeps {} of {} accidents with coordinates",
        frame.height(),
        table.height()
    );
    Ok(GeoView {
        frame,
        midpoint,
        zoom: DEFAULT_ZOOM,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{row, table};

    #[test]
    fn drops_rows_missing_either_coordinate() {
        let t = table(&[
            row().at("40.70", "-73.90"),
            row(),
            row().at("40.80", "-73.95").injured("2"),
            row().at("40.60", "-74.00"),
        ]);
        let geo = build_geo_subset(&t).unwrap();
        assert_eq!(geo.frame.height(), 3);
        let names: Vec<&str> = geo.frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, GEO_COLUMNS.map(Field::label).to_vec());

        let mid = geo.midpoint.unwrap();
        assert!((mid.latitude - 40.70).abs() < 1e-9);
        assert!((mid.longitude - -73.95).abs() < 1e-9);
        assert_eq!(geo.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn no_coordinates_means_no_midpoint() {
        let geo = build_geo_subset(&table(&[row(), row()])).unwrap();
        assert!(geo.is_empty());
        assert_eq!(geo.midpoint, None);
    }

    #[test]
    fn empty_input_gives_empty_view() {
        let geo = build_geo_subset(&AccidentTable::default()).unwrap();
        assert!(geo.is_empty());
        assert_eq!(geo.midpoint, None);
        let names: Vec<&str> = geo.frame.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, GEO_COLUMNS.map(Field::label).to_vec());
    }
}
