//! Fisher's method classifier.

use std::collections::HashMap;

use tracing::debug;

use super::chi2::invchi2;
use super::{CategoryScore, Classifier, DocumentClassifier};
use crate::error::{DocclassError, Result};
use crate::features::FeatureSet;

/// Minimum of a category without an explicit setting.
pub const DEFAULT_MINIMUM: f64 = 0.0;

/// Combines per-feature category probabilities with Fisher's method.
///
/// For each feature, `cprob` estimates `Pr(category | feature)` assuming
/// categories of equal size. The smoothed probabilities are multiplied, turned
/// into the statistic `-2 ln p`, and mapped through the inverse chi-square
/// function with `2 * n_features` degrees of freedom. A category wins only if
/// its probability is above its configured minimum.
///
/// Items without features have no defined probability and fail with
/// `NumericDegenerate`.
#[derive(Debug, Clone)]
pub struct FisherClassifier {
    base: Classifier,
    minimums: HashMap<String, f64>,
}

impl FisherClassifier {
    /// Create a Fisher classifier over `base`.
    pub fn new(base: Classifier) -> Self {
        FisherClassifier {
            base,
            minimums: HashMap::new(),
        }
    }

    /// Minimum of `category`, 0.0 unless set.
    pub fn get_minimum(&self, category: &str) -> f64 {
        self.minimums
            .get(category)
            .copied()
            .unwrap_or(DEFAULT_MINIMUM)
    }

    /// Set the minimum probability `category` needs to win.
    pub fn set_minimum(&mut self, category: &str, minimum: f64) -> Result<()> {
        if !minimum.is_finite() {
            return Err(DocclassError::invalid_argument(format!(
                "minimum for '{category}' must be finite, got {minimum}"
            )));
        }
        self.minimums.insert(category.to_string(), minimum);
        Ok(())
    }

    /// Every explicitly set minimum.
    pub fn minimums(&self) -> &HashMap<String, f64> {
        &self.minimums
    }

    /// `Pr(category | feature)`, normalized over the feature probabilities of
    /// every category.
    pub fn cprob(&self, feature: &str, category: &str) -> Result<f64> {
        self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        self.cprob_in(feature, category, &categories)
    }

    fn cprob_in(&self, feature: &str, category: &str, categories: &[String]) -> Result<f64> {
        let clf = self.base.raw_feature_prob(feature, category)?;
        if clf == 0.0 {
            return Ok(0.0);
        }

        let mut freq_sum = 0.0;
        for other in categories {
            freq_sum += self.base.raw_feature_prob(feature, other)?;
        }

        Ok(clf / freq_sum)
    }

    /// The Fisher probability that `item` belongs to `category`.
    pub fn fisher_prob(&self, item: &str, category: &str) -> Result<f64> {
        self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;
        self.fisher_prob_of(&features, category, &categories)
    }

    fn fisher_prob_of(
        &self,
        features: &FeatureSet,
        category: &str,
        categories: &[String],
    ) -> Result<f64> {
        let mut log_p = 0.0;
        for feature in features {
            let basic_prob = self.cprob_in(feature, category, categories)?;
            log_p += self
                .base
                .weighted_prob_in(feature, basic_prob, categories)?
                .ln();
        }

        let fisher_score = (-2.0 * log_p).max(0.0);
        invchi2(fisher_score, features.len() * 2)
    }
}

impl DocumentClassifier for FisherClassifier {
    fn base(&self) -> &Classifier {
        &self.base
    }

    fn prob(&self, item: &str, category: &str) -> Result<f64> {
        self.fisher_prob(item, category)
    }

    fn scores(&self, item: &str) -> Result<Vec<CategoryScore>> {
        self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;

        categories
            .iter()
            .map(|category| {
                Ok(CategoryScore {
                    category: category.clone(),
                    score: self.fisher_prob_of(&features, category, &categories)?,
                })
            })
            .collect()
    }

    fn decide(&self, item: &str) -> Result<Option<String>> {
        let mut best = None;
        let mut max = 0.0;

        for CategoryScore { category, score } in self.scores(item)? {
            if score > max && score > self.get_minimum(&category) {
                max = score;
                best = Some(category);
            }
        }

        debug!(classifier = self.name(), category = ?best, score = max, "classified item");
        Ok(best)
    }

    fn name(&self) -> &'static str {
        "fisher"
    }
}
