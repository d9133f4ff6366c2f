//! Statistical document classifiers.
//!
//! Every classifier is built on a [`Classifier`] base that owns the injected
//! [`FeatureExtractor`] and [`CountStore`] and implements training and the
//! smoothed per-feature probabilities. The algorithms differ only in how they
//! score an item against a category and in their acceptance rule:
//!
//! - [`NaiveBayesClassifier`] - `Pr(item | cat) * Pr(cat)` with per-category thresholds
//! - [`ComplementNaiveBayesClassifier`] - fit to every category except the candidate
//! - [`FisherClassifier`] - per-feature probabilities combined with Fisher's method
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use docclass::classifier::{Classifier, DocumentClassifier, NaiveBayesClassifier};
//! use docclass::store::MemoryCountStore;
//!
//! # fn main() -> docclass::error::Result<()> {
//! let store = Arc::new(MemoryCountStore::new("alice"));
//! let classifier = NaiveBayesClassifier::new(Classifier::new(store));
//!
//! classifier.train("the quick brown fox jumps", "good")?;
//! classifier.train("make quick money in the online casino", "bad")?;
//!
//! assert_eq!(classifier.classify("online casino", "unknown")?, "bad");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocclassError, Result};
use crate::features::{FeatureExtractor, FeatureSet, WordFeatureExtractor};
use crate::store::CountStore;

pub mod chi2;
pub mod complement;
pub mod fisher;
pub mod naive_bayes;

pub use chi2::invchi2;
pub use complement::ComplementNaiveBayesClassifier;
pub use fisher::FisherClassifier;
pub use naive_bayes::NaiveBayesClassifier;

/// Default weight of the assumed probability.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Default assumed probability of a feature never seen before.
pub const DEFAULT_ASSUMED_PROB: f64 = 0.5;

/// Parameters of the weighted-probability smoothing.
///
/// A feature seen `totals` times across all categories gets
/// `(weight * assumed_prob + totals * basic_prob) / (weight + totals)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Smoothing {
    /// How many observations the assumed probability is worth.
    pub weight: f64,
    /// Probability assumed for a feature with no observations.
    pub assumed_prob: f64,
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing {
            weight: DEFAULT_WEIGHT,
            assumed_prob: DEFAULT_ASSUMED_PROB,
        }
    }
}

/// The score of one category for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// The category label.
    pub category: String,
    /// The algorithm score; see each classifier for its scale.
    pub score: f64,
}

/// Training and shared probability estimates.
#[derive(Clone)]
pub struct Classifier {
    extractor: Arc<dyn FeatureExtractor>,
    store: Arc<dyn CountStore>,
    smoothing: Smoothing,
}

impl Classifier {
    /// Create a classifier base with the default word extractor.
    pub fn new(store: Arc<dyn CountStore>) -> Self {
        Self::with_extractor(store, Arc::new(WordFeatureExtractor::new()))
    }

    /// Create a classifier base with a custom extractor.
    pub fn with_extractor(store: Arc<dyn CountStore>, extractor: Arc<dyn FeatureExtractor>) -> Self {
        Classifier {
            extractor,
            store,
            smoothing: Smoothing::default(),
        }
    }

    /// Replace the smoothing parameters.
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// The count store.
    pub fn store(&self) -> &Arc<dyn CountStore> {
        &self.store
    }

    /// The feature extractor.
    pub fn extractor(&self) -> &Arc<dyn FeatureExtractor> {
        &self.extractor
    }

    /// The smoothing parameters.
    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Extract the features of `item`.
    pub fn features(&self, item: &str) -> Result<FeatureSet> {
        self.extractor.extract(item)
    }

    /// Record that `item` belongs to `category`.
    ///
    /// Every feature of the item is counted once under the category, the
    /// category counter is incremented once, and the store is committed.
    /// Training the same pair twice counts it twice.
    pub fn train(&self, item: &str, category: &str) -> Result<()> {
        if category.is_empty() {
            return Err(DocclassError::invalid_argument("category must not be empty"));
        }

        let features = self.features(item)?;
        for feature in &features {
            self.store.increment_feature_count(feature, category)?;
        }
        self.store.increment_category_count(category)?;
        self.store.commit()?;

        debug!(
            scope = self.store.scope(),
            category,
            features = features.len(),
            "trained item"
        );
        Ok(())
    }

    /// Fail with `InvalidState` unless something has been trained.
    ///
    /// Returns the total category count.
    pub fn ensure_trained(&self) -> Result<f64> {
        let total = self.store.total_count()?;
        if total <= 0.0 {
            return Err(DocclassError::invalid_state(format!(
                "no items trained for '{}'",
                self.store.scope()
            )));
        }
        Ok(total)
    }

    /// Trained categories, failing with `InvalidState` if there are none.
    pub fn trained_categories(&self) -> Result<Vec<String>> {
        let categories = self.store.categories()?;
        if categories.is_empty() {
            return Err(DocclassError::invalid_state(format!(
                "no categories trained for '{}'",
                self.store.scope()
            )));
        }
        Ok(categories)
    }

    /// `Pr(feature | category)`: the share of the category's items containing
    /// the feature, 0.0 for a category never trained.
    pub fn feature_prob(&self, feature: &str, category: &str) -> Result<f64> {
        self.ensure_trained()?;
        self.raw_feature_prob(feature, category)
    }

    pub(crate) fn raw_feature_prob(&self, feature: &str, category: &str) -> Result<f64> {
        let category_count = self.store.get_category_count(category)?;
        if category_count == 0.0 {
            return Ok(0.0);
        }
        let feature_count = self.store.get_feature_count(feature, category)?;
        Ok(feature_count / category_count)
    }

    /// `Pr(category)`: the category's share of all trained items.
    pub fn category_prob(&self, category: &str) -> Result<f64> {
        let total = self.ensure_trained()?;
        Ok(self.store.get_category_count(category)? / total)
    }

    /// Smooth `basic_prob` with the configured weight and assumed probability.
    pub fn weighted_prob(&self, feature: &str, basic_prob: f64) -> Result<f64> {
        let Smoothing {
            weight,
            assumed_prob,
        } = self.smoothing;
        self.weighted_prob_with(feature, basic_prob, weight, assumed_prob)
    }

    /// Smooth `basic_prob` with explicit parameters.
    ///
    /// Equals `assumed_prob` exactly when the feature was never observed.
    pub fn weighted_prob_with(
        &self,
        feature: &str,
        basic_prob: f64,
        weight: f64,
        assumed_prob: f64,
    ) -> Result<f64> {
        let categories = self.trained_categories()?;
        self.smooth(feature, basic_prob, weight, assumed_prob, &categories)
    }

    /// Smooth with the configured parameters over an already fetched category list.
    pub(crate) fn weighted_prob_in(
        &self,
        feature: &str,
        basic_prob: f64,
        categories: &[String],
    ) -> Result<f64> {
        self.smooth(
            feature,
            basic_prob,
            self.smoothing.weight,
            self.smoothing.assumed_prob,
            categories,
        )
    }

    fn smooth(
        &self,
        feature: &str,
        basic_prob: f64,
        weight: f64,
        assumed_prob: f64,
        categories: &[String],
    ) -> Result<f64> {
        let mut totals = 0.0;
        for category in categories {
            totals += self.store.get_feature_count(feature, category)?;
        }
        if totals == 0.0 {
            return Ok(assumed_prob);
        }

        let denominator = weight + totals;
        if denominator == 0.0 {
            return Err(DocclassError::numeric(format!(
                "smoothing denominator is zero for feature '{feature}'"
            )));
        }

        Ok((weight * assumed_prob + totals * basic_prob) / denominator)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("extractor", &self.extractor.name())
            .field("store", &self.store.scope())
            .field("smoothing", &self.smoothing)
            .finish()
    }
}

/// Common interface of the classification algorithms.
pub trait DocumentClassifier: Send + Sync {
    /// The shared training and probability base.
    fn base(&self) -> &Classifier;

    /// Record that `item` belongs to `category`.
    fn train(&self, item: &str, category: &str) -> Result<()> {
        self.base().train(item, category)
    }

    /// The algorithm score of `item` against `category`.
    fn prob(&self, item: &str, category: &str) -> Result<f64>;

    /// The score of every trained category, in enumeration order.
    fn scores(&self, item: &str) -> Result<Vec<CategoryScore>>;

    /// The winning category, or `None` when the acceptance rule picks none.
    ///
    /// Fails with `InvalidState` when nothing has been trained.
    fn decide(&self, item: &str) -> Result<Option<String>>;

    /// The winning category, or `default` when the acceptance rule picks none.
    ///
    /// Fails with `InvalidState` when nothing has been trained.
    fn classify(&self, item: &str, default: &str) -> Result<String> {
        Ok(self.decide(item)?.unwrap_or_else(|| default.to_string()))
    }

    /// Name of the algorithm.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryCountStore;

    /// Train the five-item good/bad sample set.
    pub(crate) fn sample_train(classifier: &Classifier) {
        classifier.train("Nobody owns the water.", "good").unwrap();
        classifier
            .train("the quick rabbit jumps fences", "good")
            .unwrap();
        classifier.train("buy pharmaceuticals now", "bad").unwrap();
        classifier
            .train("make quick money in the online casino", "bad")
            .unwrap();
        classifier.train("the quick brown fox jumps", "good").unwrap();
    }

    pub(crate) fn sample_classifier() -> Classifier {
        let classifier = Classifier::new(Arc::new(MemoryCountStore::new("test")));
        sample_train(&classifier);
        classifier
    }

    #[test]
    fn test_train_counts() {
        let classifier = sample_classifier();
        let store = classifier.store();

        assert_eq!(store.get_feature_count("quick", "good").unwrap(), 2.0);
        assert_eq!(store.get_feature_count("quick", "bad").unwrap(), 1.0);
        assert_eq!(store.get_category_count("good").unwrap(), 3.0);
        assert_eq!(store.get_category_count("bad").unwrap(), 2.0);
        assert_eq!(store.total_count().unwrap(), 5.0);
    }

    #[test]
    fn test_train_twice_doubles_counts() {
        let classifier = Classifier::new(Arc::new(MemoryCountStore::new("test")));
        classifier.train("online casino", "bad").unwrap();
        classifier.train("online casino", "bad").unwrap();

        let store = classifier.store();
        assert_eq!(store.get_feature_count("online", "bad").unwrap(), 2.0);
        assert_eq!(store.get_feature_count("casino", "bad").unwrap(), 2.0);
        assert_eq!(store.get_category_count("bad").unwrap(), 2.0);
    }

    #[test]
    fn test_train_rejects_empty_category() {
        let classifier = Classifier::new(Arc::new(MemoryCountStore::new("test")));
        let err = classifier.train("anything", "").unwrap_err();
        assert!(matches!(err, DocclassError::InvalidArgument(_)));
    }

    #[test]
    fn test_feature_prob() {
        let classifier = sample_classifier();

        let p = classifier.feature_prob("quick", "good").unwrap();
        assert!((p - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(classifier.feature_prob("quick", "ugly").unwrap(), 0.0);
    }

    #[test]
    fn test_weighted_prob() {
        let classifier = sample_classifier();

        let basic = classifier.feature_prob("money", "good").unwrap();
        let p = classifier.weighted_prob("money", basic).unwrap();
        assert!((p - 0.25).abs() < 1e-12);

        // A feature never observed gets exactly the assumed probability.
        assert_eq!(classifier.weighted_prob("zebra", 0.9).unwrap(), 0.5);
        assert_eq!(
            classifier.weighted_prob_with("zebra", 0.9, 3.0, 0.2).unwrap(),
            0.2
        );
    }

    #[test]
    fn test_weighted_prob_unseen_feature_ignores_weight() {
        let classifier = sample_classifier();

        assert_eq!(
            classifier.weighted_prob_with("zebra", 0.5, 0.0, 0.3).unwrap(),
            0.3
        );
        assert_eq!(
            classifier.weighted_prob_with("zebra", 0.1, 7.0, 0.7).unwrap(),
            0.7
        );
    }

    #[test]
    fn test_weighted_prob_zero_denominator() {
        let classifier = sample_classifier();
        // "money" was seen once, so weight -1 cancels it.
        let err = classifier
            .weighted_prob_with("money", 0.5, -1.0, 0.5)
            .unwrap_err();
        assert!(matches!(err, DocclassError::NumericDegenerate(_)));
    }

    #[test]
    fn test_category_prob() {
        let classifier = sample_classifier();
        assert!((classifier.category_prob("good").unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(classifier.category_prob("ugly").unwrap(), 0.0);
    }

    #[test]
    fn test_untrained_probabilities_fail() {
        let classifier = Classifier::new(Arc::new(MemoryCountStore::new("test")));

        assert!(classifier.feature_prob("quick", "good").unwrap_err().is_untrained());
        assert!(classifier.weighted_prob("quick", 0.5).unwrap_err().is_untrained());
        assert!(classifier.category_prob("good").unwrap_err().is_untrained());
    }
}
