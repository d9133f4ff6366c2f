//! In-memory count store for testing and short-lived models.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::error::{DocclassError, Result};
use crate::store::{CountStore, CountTable, FeatureCount};

/// An in-memory count store.
///
/// Counters for every owner live in one shared map, so handles created with
/// [`MemoryCountStore::scoped`] see the same data under a different owner key.
#[derive(Debug, Clone)]
pub struct MemoryCountStore {
    /// Owner key of this handle.
    scope: String,
    /// Count tables of every owner.
    tables: Arc<RwLock<HashMap<String, CountTable>>>,
    /// Whether the store is closed.
    closed: Arc<AtomicBool>,
}

impl MemoryCountStore {
    /// Create a new, empty memory store for `scope`.
    pub fn new<S: Into<String>>(scope: S) -> Self {
        MemoryCountStore {
            scope: scope.into(),
            tables: Arc::new(RwLock::new(HashMap::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle on the same data for another owner.
    pub fn scoped<S: Into<String>>(&self, scope: S) -> Self {
        MemoryCountStore {
            scope: scope.into(),
            tables: Arc::clone(&self.tables),
            closed: Arc::clone(&self.closed),
        }
    }

    /// Number of owners with recorded counts.
    pub fn scope_count(&self) -> usize {
        self.tables.read().len()
    }

    /// Close the store; every later call fails.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Check if the storage is closed.
    fn check_closed(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(DocclassError::storage("memory count store is closed"))
        } else {
            Ok(())
        }
    }

    fn read<T>(&self, f: impl FnOnce(&CountTable) -> T) -> Result<T> {
        self.check_closed()?;
        let tables = self.tables.read();
        match tables.get(&self.scope) {
            Some(table) => Ok(f(table)),
            None => Ok(f(&CountTable::default())),
        }
    }

    fn write(&self, f: impl FnOnce(&mut CountTable)) -> Result<()> {
        self.check_closed()?;
        let mut tables = self.tables.write();
        f(tables.entry(self.scope.clone()).or_default());
        Ok(())
    }
}

impl CountStore for MemoryCountStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn increment_feature_count(&self, feature: &str, category: &str) -> Result<()> {
        self.write(|table| table.add_feature(feature, category, 1.0))
    }

    fn increment_category_count(&self, category: &str) -> Result<()> {
        self.write(|table| table.add_category(category, 1.0))
    }

    fn get_feature_count(&self, feature: &str, category: &str) -> Result<f64> {
        self.read(|table| table.feature_count(feature, category))
    }

    fn get_category_count(&self, category: &str) -> Result<f64> {
        self.read(|table| table.category_count(category))
    }

    fn total_count(&self) -> Result<f64> {
        self.read(CountTable::total)
    }

    fn categories(&self) -> Result<Vec<String>> {
        self.read(CountTable::category_names)
    }

    fn feature_counts(&self) -> Result<Vec<FeatureCount>> {
        self.read(CountTable::feature_rows)
    }

    fn commit(&self) -> Result<()> {
        // Nothing to flush.
        self.check_closed()
    }
}
