//! # docclass
//!
//! Statistical document classification over pluggable count stores.
//!
//! ## Features
//!
//! - Naive Bayes, complement naive Bayes and Fisher's method
//! - Weighted-probability smoothing for rare features
//! - Pluggable feature extraction built on a text analysis pipeline
//! - In-memory and checksummed file count stores, partitioned per owner
//! - Liking votes and feature ranking
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use docclass::classifier::{Classifier, DocumentClassifier, FisherClassifier};
//! use docclass::store::MemoryCountStore;
//!
//! # fn main() -> docclass::error::Result<()> {
//! let store = Arc::new(MemoryCountStore::new("alice"));
//! let classifier = FisherClassifier::new(Classifier::new(store));
//!
//! classifier.train("the quick rabbit jumps fences", "good")?;
//! classifier.train("buy pharmaceuticals now", "bad")?;
//!
//! assert_eq!(classifier.classify("cheap pharmaceuticals", "unknown")?, "bad");
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod choice;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod ranking;
pub mod store;

pub mod prelude {
    pub use crate::choice::LikingChoice;
    pub use crate::classifier::{
        Classifier, ComplementNaiveBayesClassifier, DocumentClassifier, FisherClassifier,
        NaiveBayesClassifier,
    };
    pub use crate::config::{Algorithm, ClassifierConfig};
    pub use crate::error::{DocclassError, Result};
    pub use crate::features::{FeatureExtractor, WordFeatureExtractor};
    pub use crate::store::{CountStore, CountStoreFactory, MemoryCountStore, StoreConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
