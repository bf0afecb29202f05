//! Dataset Cache
//! Computes the cleaned accident table once and hands out shared references afterwards.

use super::loader::{load_table, LoadError};
use super::processor::MalformedRows;
use super::table::AccidentTable;
use log::debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type TableSource = Box<dyn Fn() -> Result<AccidentTable, LoadError> + Send + Sync>;

/// Owns the memoised accident table for one data source.
///
/// The first successful [`DatasetCache::load`] runs the source and stores the
/// result; later calls return the stored table without locking. A failed load
/// stores nothing, so the next call tries again.
pub struct DatasetCache {
    source: TableSource,
    table: OnceLock<Arc<AccidentTable>>,
    init: Mutex<()>,
}

impl DatasetCache {
    /// Cache backed by an arbitrary table source.
    pub fn new<F>(source: F) -> Self
    where
        F: Fn() -> Result<AccidentTable, LoadError> + Send + Sync + 'static,
    {
        Self {
            source: Box::new(source),
            table: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// Cache backed by a CSV file on disk.
    pub fn from_csv(path: impl Into<PathBuf>, policy: MalformedRows) -> Self {
        let path = path.into();
        Self::new(move || load_table(&path, policy))
    }

    /// Get the cleaned table, loading it on first use.
    pub fn load(&self) -> Result<Arc<AccidentTable>, LoadError> {
        if let Some(table) = self.table.get() {
            debug!("Dataset cache hit");
            return Ok(Arc::clone(table));
        }

        // Serialise the expensive pass; losers of the race find it filled in
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }

        debug!("Dataset cache miss, loading");
        let table = Arc::new((self.source)()?);
        Ok(Arc::clone(self.table.get_or_init(|| table)))
    }

    /// Whether the table has already been computed.
    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{row, table};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn computes_once_across_threads() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = Arc::new(DatasetCache::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(table(&[row(), row()]))
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.load().unwrap().height())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded());
        let first = cache.load().unwrap();
        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failed_load_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = DatasetCache::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LoadError::MissingFile(PathBuf::from("later.csv")))
            } else {
                Ok(table(&[row()]))
            }
        });

        assert!(cache.load().is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.load().unwrap().height(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_csv_surfaces_as_missing_file() {
        let cache = DatasetCache::from_csv("/no/such/accidents.csv", MalformedRows::Fail);
        assert!(matches!(cache.load(), Err(LoadError::MissingFile(_))));
    }
}
