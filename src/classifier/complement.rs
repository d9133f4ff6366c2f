//! Complement naive Bayes classifier.

use tracing::debug;

use super::{CategoryScore, Classifier, DocumentClassifier};
use crate::error::Result;
use crate::features::FeatureSet;

/// Scores a category by how poorly the item fits every *other* category.
///
/// The score is `ln Pr(cat) - ln Pr(item | not cat)` and the category with the
/// highest positive score wins. Scoring each category against the pooled
/// counts of the rest behaves better than plain naive Bayes when category
/// sizes are skewed.
#[derive(Debug, Clone)]
pub struct ComplementNaiveBayesClassifier {
    base: Classifier,
}

impl ComplementNaiveBayesClassifier {
    /// Create a complement naive Bayes classifier over `base`.
    pub fn new(base: Classifier) -> Self {
        ComplementNaiveBayesClassifier { base }
    }

    /// `Pr(item | every category except category)`.
    pub fn complement_doc_prob(&self, item: &str, category: &str) -> Result<f64> {
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;
        Ok(self
            .log_complement_doc_prob_of(&features, category, &categories)?
            .exp())
    }

    /// `ln Pr(category) - ln Pr(item | every category except category)`.
    pub fn complement_bayes_prob(&self, item: &str, category: &str) -> Result<f64> {
        let total = self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;
        self.score_of(&features, category, &categories, total)
    }

    fn log_complement_doc_prob_of(
        &self,
        features: &FeatureSet,
        category: &str,
        categories: &[String],
    ) -> Result<f64> {
        let store = self.base.store();
        let mut log_p = 0.0;

        for feature in features {
            let mut feature_count = 0.0;
            let mut category_count = 0.0;
            for other in categories.iter().filter(|c| c.as_str() != category) {
                feature_count += store.get_feature_count(feature, other)?;
                category_count += store.get_category_count(other)?;
            }

            let basic_prob = if category_count == 0.0 {
                0.0
            } else {
                feature_count / category_count
            };
            log_p += self
                .base
                .weighted_prob_in(feature, basic_prob, categories)?
                .ln();
        }

        Ok(log_p)
    }

    fn score_of(
        &self,
        features: &FeatureSet,
        category: &str,
        categories: &[String],
        total: f64,
    ) -> Result<f64> {
        let category_prob = self.base.store().get_category_count(category)? / total;
        let log_complement = self.log_complement_doc_prob_of(features, category, categories)?;
        Ok(category_prob.ln() - log_complement)
    }
}

impl DocumentClassifier for ComplementNaiveBayesClassifier {
    fn base(&self) -> &Classifier {
        &self.base
    }

    fn prob(&self, item: &str, category: &str) -> Result<f64> {
        self.complement_bayes_prob(item, category)
    }

    fn scores(&self, item: &str) -> Result<Vec<CategoryScore>> {
        let total = self.base.ensure_trained()?;
        let categories = self.base.trained_categories()?;
        let features = self.base.features(item)?;

        categories
            .iter()
            .map(|category| {
                Ok(CategoryScore {
                    category: category.clone(),
                    score: self.score_of(&features, category, &categories, total)?,
                })
            })
            .collect()
    }

    fn decide(&self, item: &str) -> Result<Option<String>> {
        let mut best = None;
        let mut max = 0.0;

        for CategoryScore { category, score } in self.scores(item)? {
            if score > max {
                max = score;
                best = Some(category);
            }
        }

        debug!(classifier = self.name(), category = ?best, score = max, "classified item");
        Ok(best)
    }

    fn name(&self) -> &'static str {
        "complement_naive_bayes"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::classifier::tests::sample_classifier;
    use crate::store::{CountStore, MemoryCountStore};

    #[test]
    fn test_complement_doc_prob() {
        let classifier = ComplementNaiveBayesClassifier::new(sample_classifier());

        // Complement of "good" is "bad": quick 1/2 -> (0.5 + 1.5) / 4,
        // money 1/2 -> (0.5 + 0.5) / 2.
        let expected = 0.5 * 0.5;
        let actual = classifier.complement_doc_prob("quick money", "good").unwrap();
        assert!((actual - expected).abs() < 1e-12);
    }

    #[test]
    fn test_complement_bayes_prob() {
        let classifier = ComplementNaiveBayesClassifier::new(sample_classifier());

        let score = classifier.complement_bayes_prob("quick money", "good").unwrap();
        assert!((score - (0.6f64.ln() - 0.25f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_single_category_has_empty_complement() {
        let base = Classifier::new(Arc::new(MemoryCountStore::new("solo")));
        base.train("online casino", "bad").unwrap();
        let classifier = ComplementNaiveBayesClassifier::new(base);

        // No other category: basic probability 0, smoothed to 0.5 / 2.
        let p = classifier.complement_doc_prob("casino", "bad").unwrap();
        assert!((p - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_classify_prefers_highest_ratio() {
        let classifier = ComplementNaiveBayesClassifier::new(sample_classifier());
        let scores = classifier.scores("quick money").unwrap();

        let best = scores
            .iter()
            .filter(|s| s.score > 0.0)
            .fold(None::<&CategoryScore>, |best, s| match best {
                Some(b) if b.score >= s.score => Some(b),
                _ => Some(s),
            })
            .map(|s| s.category.clone())
            .unwrap_or_else(|| "unknown".to_string());

        assert_eq!(classifier.classify("quick money", "unknown").unwrap(), best);
    }

    #[test]
    fn test_classify_keeps_default_without_positive_score() {
        let store = Arc::new(MemoryCountStore::new("solo"));
        let base = Classifier::new(store.clone());
        base.train("online casino", "bad").unwrap();
        let classifier = ComplementNaiveBayesClassifier::new(base);

        // ln(1) - ln(0.25 * 0.25) > 0, so the only category wins.
        assert_eq!(classifier.classify("online casino", "unknown").unwrap(), "bad");
        assert_eq!(store.total_count().unwrap(), 1.0);

        // With no features the complement probability is 1 and the score 0.
        assert_eq!(classifier.classify("", "unknown").unwrap(), "unknown");
    }

    #[test]
    fn test_untrained_classify_fails() {
        let classifier =
            ComplementNaiveBayesClassifier::new(Classifier::new(Arc::new(MemoryCountStore::new(
                "empty",
            ))));
        assert!(classifier.classify("anything", "x").unwrap_err().is_untrained());
    }
}
