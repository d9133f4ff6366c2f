//! Count store abstraction.
//!
//! Classifiers keep no counts of their own. Every training increment and every
//! probability read goes through a [`CountStore`], so the scoring logic never
//! depends on a storage technology.
//!
//! # Architecture
//!
//! - **CountStore trait**: counters keyed by (feature, category) and (category),
//!   scoped to one owner per store handle
//! - **StoreConfig enum**: type-safe configuration for the bundled adapters
//! - **CountStoreFactory**: helper for constructing concrete stores
//!
//! # Adapters
//!
//! ## MemoryCountStore
//! - In-memory counters, shared between handles of different owners
//! - `commit` is a no-op
//!
//! ## FileCountStore
//! - One checksummed snapshot file per owner
//! - `commit` rewrites the snapshot atomically
//!
//! Both adapters enumerate categories in ascending lexicographic order.
//!
//! # Example
//!
//! ```
//! use docclass::store::{CountStore, CountStoreFactory, StoreConfig};
//!
//! # fn main() -> docclass::error::Result<()> {
//! let store = CountStoreFactory::create(&StoreConfig::Memory, "alice")?;
//! store.increment_feature_count("casino", "bad")?;
//! store.increment_category_count("bad")?;
//! store.commit()?;
//!
//! assert_eq!(store.get_feature_count("casino", "bad")?, 1.0);
//! assert_eq!(store.total_count()?, 1.0);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DocclassError, Result};

pub mod file;
pub mod memory;
pub mod snapshot;

pub use file::{FileCountStore, FileStoreConfig};
pub use memory::MemoryCountStore;

/// One (feature, category) counter row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCount {
    /// The feature token.
    pub feature: String,
    /// The category the feature was seen under.
    pub category: String,
    /// How many trained items of `category` contained `feature`.
    pub count: f64,
}

/// One category counter row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category label.
    pub category: String,
    /// How many items were trained under the category.
    pub count: f64,
}

/// Durable counters consumed by the classifiers.
///
/// All operations are scoped to the owner the handle was created for. Methods
/// take `&self`; adapters use interior mutability and guarantee that a single
/// increment is atomic. Nothing beyond that is promised: a `classify` running
/// concurrently with `train` on the same owner may observe partial training.
pub trait CountStore: Send + Sync + Debug {
    /// The owner key this handle reads and writes.
    fn scope(&self) -> &str;

    /// Create-or-add 1.0 to the (feature, category) counter.
    fn increment_feature_count(&self, feature: &str, category: &str) -> Result<()>;

    /// Create-or-add 1 to the category counter.
    fn increment_category_count(&self, category: &str) -> Result<()>;

    /// Count of `feature` under `category`, 0.0 if absent.
    fn get_feature_count(&self, feature: &str, category: &str) -> Result<f64>;

    /// Count of `category`, 0.0 if absent.
    fn get_category_count(&self, category: &str) -> Result<f64>;

    /// Sum of every category count of the scope; 0.0 when nothing was trained.
    ///
    /// Fails instead of returning a sentinel when the store is unavailable.
    fn total_count(&self) -> Result<f64>;

    /// Every category with at least one trained occurrence.
    fn categories(&self) -> Result<Vec<String>>;

    /// Every (feature, category) row of the scope.
    fn feature_counts(&self) -> Result<Vec<FeatureCount>>;

    /// Flush boundary, called once at the end of each training call.
    fn commit(&self) -> Result<()>;
}

/// In-memory counters of one owner.
///
/// Shared by the bundled adapters; `BTreeMap` keeps enumeration order
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountTable {
    /// feature -> category -> count
    features: BTreeMap<String, BTreeMap<String, f64>>,
    /// category -> count
    categories: BTreeMap<String, f64>,
}

impl CountTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the (feature, category) counter.
    pub fn add_feature(&mut self, feature: &str, category: &str, amount: f64) {
        *self
            .features
            .entry(feature.to_string())
            .or_default()
            .entry(category.to_string())
            .or_insert(0.0) += amount;
    }

    /// Add `amount` to the category counter.
    pub fn add_category(&mut self, category: &str, amount: f64) {
        *self.categories.entry(category.to_string()).or_insert(0.0) += amount;
    }

    /// Count of `feature` under `category`.
    pub fn feature_count(&self, feature: &str, category: &str) -> f64 {
        self.features
            .get(feature)
            .and_then(|by_category| by_category.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    /// Count of `category`.
    pub fn category_count(&self, category: &str) -> f64 {
        self.categories.get(category).copied().unwrap_or(0.0)
    }

    /// Sum of all category counts.
    pub fn total(&self) -> f64 {
        self.categories.values().sum()
    }

    /// Categories with a positive count, in ascending order.
    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|(_, count)| **count > 0.0)
            .map(|(category, _)| category.clone())
            .collect()
    }

    /// All category rows, in ascending order.
    pub fn category_rows(&self) -> Vec<CategoryCount> {
        self.categories
            .iter()
            .map(|(category, count)| CategoryCount {
                category: category.clone(),
                count: *count,
            })
            .collect()
    }

    /// All feature rows, ordered by feature then category.
    pub fn feature_rows(&self) -> Vec<FeatureCount> {
        self.features
            .iter()
            .flat_map(|(feature, by_category)| {
                by_category.iter().map(move |(category, count)| FeatureCount {
                    feature: feature.clone(),
                    category: category.clone(),
                    count: *count,
                })
            })
            .collect()
    }

    /// Number of distinct features.
    pub fn vocabulary_size(&self) -> usize {
        self.features.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.features.is_empty()
    }

    /// Add every counter of `other` to this table.
    pub fn merge(&mut self, other: &CountTable) {
        for (category, count) in &other.categories {
            self.add_category(category, *count);
        }
        for (feature, by_category) in &other.features {
            for (category, count) in by_category {
                self.add_feature(feature, category, *count);
            }
        }
    }
}

/// Configuration for the bundled count stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Counters kept in process memory.
    #[default]
    Memory,
    /// Counters persisted to snapshot files in a directory.
    File(FileStoreConfig),
}

/// Builds count stores from a [`StoreConfig`].
pub struct CountStoreFactory;

impl CountStoreFactory {
    /// Create a store handle for `scope`.
    pub fn create(config: &StoreConfig, scope: &str) -> Result<Arc<dyn CountStore>> {
        if scope.is_empty() {
            return Err(DocclassError::invalid_argument("store scope must not be empty"));
        }

        match config {
            StoreConfig::Memory => Ok(Arc::new(MemoryCountStore::new(scope))),
            StoreConfig::File(file_config) => {
                Ok(Arc::new(FileCountStore::open(file_config.clone(), scope)?))
            }
        }
    }
}
