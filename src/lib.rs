//! NYC Accidents - filtering, chart preparation and export for the NYPD collision dataset
//!
//! The cleaned table is loaded once per process through [`data::DatasetCache`];
//! every user interaction then runs [`data::filter`] followed by the chart
//! builders in [`charts`], and the export in [`export`] on demand.

pub mod charts;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod schema;
pub mod stats;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardError, DashboardView};
pub use data::{AccidentTable, DatasetCache, FilterCriteria};
