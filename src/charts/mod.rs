//! Charts module - chart input preparation
//!
//! Each builder consumes the filtered table and returns a ready-to-plot frame
//! plus the field names a renderer needs. Empty input gives empty output.

mod axes;
mod factors;
mod geo;
mod timeseries;

use polars::prelude::PolarsError;
use thiserror::Error;

pub use axes::{legend_options, time_axis_options, FactorField, Legend, Measure, TimeAxis};
pub use factors::{build_top_factors, TopFactors, DEFAULT_TOP_N};
pub use geo::{build_geo_subset, GeoPoint, GeoView, DEFAULT_ZOOM, GEO_COLUMNS};
pub use timeseries::{build_timeseries, TimeSeries};

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}
