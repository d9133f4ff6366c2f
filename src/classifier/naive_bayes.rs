//! Naive Bayes classifier with per-category acceptance thresholds.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{CategoryScore, Classifier, DocumentClassifier};
use crate::error::{DocclassError, Result};
use crate::features::FeatureSet;

/// Threshold of a category without an explicit setting.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Scores `Pr(item | cat) * Pr(cat)` under the feature independence assumption.
///
/// A winner is only accepted when its score beats every other category's
/// score multiplied by the winner's threshold. Products of per-feature
/// probabilities are summed as logarithms; [`scores`](DocumentClassifier::scores)
/// reports the natural log of `bayes_prob`.
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    base: Classifier,
    thresholds: HashMap<String, f64>,
}

impl NaiveBayesClassifier {
    /// Create a naive Bayes classifier over `base`.
    pub fn new(base: Classifier) -> Self {
        NaiveBayesClassifier {
            base,
            thresholds: HashMap::new(),
        }
    }

    /// Threshold of `category`, 1.0 unless set.
    pub fn get_threshold(&self, category: &str) -> f64 {
        self.thresholds
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    /// Set the threshold of `category`.
    ///
    /// A threshold of 3.0 means the category only wins when its score is at
    /// least three times that of every other category.
    pub fn set_threshold(&mut self, category: &str, threshold: f64) -> Result<()> {
        if !threshold.is_finite() {
            return Err(DocclassError::invalid_argument(format!(
                "threshold for '{category}' must be finite, got {threshold}"
            )));
        }
        self.thresholds.insert(category.to_string(), threshold);
        Ok(())
    }

    /// Every explicitly set threshold.
    pub fn thresholds(&self) -> &HashMap<String, f64> {
        &self.thresholds
    }

    /// `ln Pr(item | category)`.
    pub fn log_doc_prob(&self, item: &str, category: &str) -> Result<f64> {
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;
        self.log_doc_prob_of(&features, category, &categories)
    }

    /// `Pr(item | category)`, the product of the smoothed feature probabilities.
    pub fn doc_prob(&self, item: &str, category: &str) -> Result<f64> {
        Ok(self.log_doc_prob(item, category)?.exp())
    }

    /// `ln(Pr(item | category) * Pr(category))`.
    pub fn log_bayes_prob(&self, item: &str, category: &str) -> Result<f64> {
        let total = self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;
        self.log_bayes_prob_of(&features, category, &categories, total)
    }

    /// `Pr(item | category) * Pr(category)`, proportional to `Pr(category | item)`.
    pub fn bayes_prob(&self, item: &str, category: &str) -> Result<f64> {
        Ok(self.log_bayes_prob(item, category)?.exp())
    }

    fn log_doc_prob_of(
        &self,
        features: &FeatureSet,
        category: &str,
        categories: &[String],
    ) -> Result<f64> {
        let mut log_p = 0.0;
        for feature in features {
            let basic_prob = self.base.raw_feature_prob(feature, category)?;
            log_p += self
                .base
                .weighted_prob_in(feature, basic_prob, categories)?
                .ln();
        }
        Ok(log_p)
    }

    fn log_bayes_prob_of(
        &self,
        features: &FeatureSet,
        category: &str,
        categories: &[String],
        total: f64,
    ) -> Result<f64> {
        let category_prob = self.base.store().get_category_count(category)? / total;
        Ok(self.log_doc_prob_of(features, category, categories)? + category_prob.ln())
    }

    fn log_scores(&self, item: &str) -> Result<Vec<CategoryScore>> {
        let total = self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;

        categories
            .iter()
            .map(|category| {
                Ok(CategoryScore {
                    category: category.clone(),
                    score: self.log_bayes_prob_of(&features, category, &categories, total)?,
                })
            })
            .collect()
    }
}

impl DocumentClassifier for NaiveBayesClassifier {
    fn base(&self) -> &Classifier {
        &self.base
    }

    fn prob(&self, item: &str, category: &str) -> Result<f64> {
        self.bayes_prob(item, category)
    }

    fn scores(&self, item: &str) -> Result<Vec<CategoryScore>> {
        self.log_scores(item)
    }

    fn decide(&self, item: &str) -> Result<Option<String>> {
        let scores = self.log_scores(item)?;

        // A zero probability is ln 0 = -inf and never wins.
        let mut best: Option<&CategoryScore> = None;
        for candidate in &scores {
            let leading = best.map_or(f64::NEG_INFINITY, |b| b.score);
            if candidate.score > leading {
                best = Some(candidate);
            }
        }

        let Some(best) = best else {
            debug!(classifier = self.name(), "no category scored above zero");
            return Ok(None);
        };

        let threshold = self.get_threshold(&best.category);
        if threshold > 0.0 {
            let log_threshold = threshold.ln();
            for other in scores.iter().filter(|s| s.category != best.category) {
                if other.score + log_threshold > best.score {
                    warn!(
                        classifier = self.name(),
                        best = %best.category,
                        rival = %other.category,
                        threshold,
                        "winner rejected by threshold"
                    );
                    return Ok(None);
                }
            }
        }

        debug!(classifier = self.name(), category = %best.category, score = best.score, "classified item");
        Ok(Some(best.category.clone()))
    }

    fn name(&self) -> &'static str {
        "naive_bayes"
    }
}
