//! Data module - CSV loading, cleaning, caching and filtering
//!
//! ```text
//!  accidents.csv ──▶ loader ──▶ processor ──▶ AccidentTable (cached once)
//!                                                   │
//!                                        filter(criteria) per interaction
//! ```

mod cache;
mod filter;
mod loader;
mod processor;
mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use cache::DatasetCache;
pub use filter::{filter, DateRange, FilterCriteria, FilterError, HourRange};
pub(crate) use filter::any_of;
pub use loader::{load_table, normalize_columns, read_raw, LoadError};
pub use processor::{parse_crash_datetime, DataProcessor, MalformedRows, ProcessorError};
pub use table::AccidentTable;
