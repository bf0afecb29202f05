//! Dashboard Pipeline
//! One interaction pass: filter the cached table, count, and prepare every chart input.

use crate::charts::{
    build_geo_subset, build_timeseries, build_top_factors, ChartError, FactorField, GeoView,
    Legend, Measure, TimeAxis, TimeSeries, TopFactors, DEFAULT_TOP_N,
};
use crate::config::DashboardConfig;
use crate::data::{filter, AccidentTable, DatasetCache, FilterCriteria, FilterError, LoadError};
use crate::export::{export_file_name, export_workbook, ExportError};
use crate::schema::Field;
use crate::stats::{StatsCalculator, Summary};
use log::info;
use polars::prelude::PolarsError;
use std::sync::Arc;
use thiserror::Error;

/// Message shown instead of charts when the selection matches nothing.
pub const NO_DATA_MESSAGE: &str = "We currently have no data for the selected filters!";

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Axis and legend choices of the time-series chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSeriesSettings {
    pub x: TimeAxis,
    pub y: Measure,
    pub legend: Option<Legend>,
}

impl Default for TimeSeriesSettings {
    fn default() -> Self {
        Self {
            x: TimeAxis::CrashDate,
            y: Measure::Accidents,
            legend: Some(Legend::Area),
        }
    }
}

/// Choices of the top-factors chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorSettings {
    pub factor: FactorField,
    pub y: Measure,
    pub legend: Legend,
    pub top_n: usize,
    pub exclude_unspecified: bool,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            factor: FactorField::Vehicle1,
            y: Measure::Accidents,
            legend: Legend::Area,
            top_n: DEFAULT_TOP_N,
            exclude_unspecified: true,
        }
    }
}

/// Per-chart widget state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartSettings {
    pub timeseries: TimeSeriesSettings,
    pub factors: FactorSettings,
}

/// Filtered rows of one interaction with their headline counts.
#[derive(Debug, Clone)]
pub struct Selection {
    pub criteria: FilterCriteria,
    pub table: AccidentTable,
    pub summary: Summary,
}

/// Every chart input of one pass.
#[derive(Debug, Clone)]
pub struct Panels {
    pub timeseries: TimeSeries,
    pub top_factors: TopFactors,
    pub geo: GeoView,
}

/// What the page shows for a selection.
#[derive(Debug, Clone)]
pub enum DashboardView {
    /// Nothing matched; show the counts and [`NO_DATA_MESSAGE`] only.
    NoData { summary: Summary },
    Ready { summary: Summary, panels: Box<Panels> },
}

/// Holds the shared base table and runs interaction passes over it.
pub struct Dashboard {
    base: Arc<AccidentTable>,
}

impl Dashboard {
    pub fn new(base: Arc<AccidentTable>) -> Self {
        Self { base }
    }

    /// Dashboard over the cache's table, loading it if needed.
    pub fn from_cache(cache: &DatasetCache) -> Result<Self, DashboardError> {
        Ok(Self::new(cache.load()?))
    }

    pub fn base(&self) -> &AccidentTable {
        &self.base
    }

    /// Apply the sidebar filters and count the result.
    pub fn select(&self, criteria: &FilterCriteria) -> Result<Selection, DashboardError> {
        let table = filter(&self.base, criteria)?;
        let summary = StatsCalculator::summarize(&table)?;
        info!(
            "Selection: {} collisions ({} injurious, {} fatal)",
            summary.total, summary.injurious, summary.fatal
        );
        Ok(Selection {
            criteria: criteria.clone(),
            table,
            summary,
        })
    }

    /// Prepare every chart for a selection. The three builders run in parallel.
    pub fn render(
        &self,
        selection: &Selection,
        settings: &ChartSettings,
    ) -> Result<DashboardView, DashboardError> {
        let summary = selection.summary;
        if selection.table.is_empty() {
            return Ok(DashboardView::NoData { summary });
        }

        let table = &selection.table;
        let ts = settings.timeseries;
        let tf = settings.factors;
        let (timeseries, (top_factors, geo)) = rayon::join(
            || build_timeseries(table, ts.x, ts.y, ts.legend),
            || {
                rayon::join(
                    || {
                        build_top_factors(
                            table,
                            tf.factor,
                            tf.y,
                            tf.legend,
                            tf.top_n,
                            tf.exclude_unspecified,
                        )
                    },
                    || build_geo_subset(table),
                )
            },
        );

        Ok(DashboardView::Ready {
            summary,
            panels: Box::new(Panels {
                timeseries: timeseries?,
                top_factors: top_factors?,
                geo: geo?,
            }),
        })
    }

    /// Workbook bytes and file name for the selection's export.
    pub fn export(
        &self,
        selection: &Selection,
        config: &DashboardConfig,
    ) -> Result<(String, Vec<u8>), DashboardError> {
        let bytes = export_workbook(&selection.table, &Field::EXPORT, &config.sheet_name)?;
        Ok((export_file_name(&config.dataset_name), bytes))
    }
}
