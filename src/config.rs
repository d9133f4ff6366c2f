//! Classifier configuration.
//!
//! A [`ClassifierConfig`] selects the algorithm, the smoothing parameters, the
//! feature extraction policy, and the initial threshold and minimum tables. It
//! is usually loaded from a JSON file:
//!
//! ```json
//! {
//!   "algorithm": "fisher",
//!   "smoothing": { "weight": 1.0, "assumed_prob": 0.5 },
//!   "extractor": { "pattern": "\\w+", "min_length": 3, "max_length": 19, "lowercase": true },
//!   "minimums": { "bad": 0.6 }
//! }
//! ```
//!
//! Every field is optional and falls back to its default. With
//! `"split": true` the extractor pattern matches separators instead of words,
//! e.g. `{ "pattern": "\\W+", "split": true }`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::tokenizer::regex::DEFAULT_PATTERN;
use crate::classifier::{
    Classifier, ComplementNaiveBayesClassifier, DocumentClassifier, FisherClassifier,
    NaiveBayesClassifier, Smoothing,
};
use crate::error::{DocclassError, Result};
use crate::features::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, WordFeatureExtractor};
use crate::store::CountStore;

/// Classification algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Naive Bayes with per-category thresholds.
    #[default]
    NaiveBayes,
    /// Complement naive Bayes.
    ComplementNaiveBayes,
    /// Fisher's method with per-category minimums.
    Fisher,
}

impl Algorithm {
    /// All algorithms.
    pub const ALL: [Algorithm; 3] = [
        Algorithm::NaiveBayes,
        Algorithm::ComplementNaiveBayes,
        Algorithm::Fisher,
    ];

    /// Configuration name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::NaiveBayes => "naive_bayes",
            Algorithm::ComplementNaiveBayes => "complement_naive_bayes",
            Algorithm::Fisher => "fisher",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = DocclassError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == normalized)
            .ok_or_else(|| {
                DocclassError::config(format!(
                    "unknown algorithm '{s}', expected one of naive_bayes, complement_naive_bayes, fisher"
                ))
            })
    }
}

/// Word extraction policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Regex matching one token, or one separator when `split` is set.
    pub pattern: String,
    /// Whether `pattern` matches the text between tokens.
    pub split: bool,
    /// Shortest kept token, in characters.
    pub min_length: usize,
    /// Longest kept token, in characters.
    pub max_length: usize,
    /// Whether tokens are lower-cased.
    pub lowercase: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            pattern: DEFAULT_PATTERN.to_string(),
            split: false,
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            lowercase: true,
        }
    }
}

impl ExtractorConfig {
    /// Build the extractor this configuration describes.
    pub fn build(&self) -> Result<WordFeatureExtractor> {
        let build = if self.split {
            WordFeatureExtractor::with_separator
        } else {
            WordFeatureExtractor::with_options
        };
        build(
            &self.pattern,
            self.min_length,
            self.max_length,
            self.lowercase,
        )
    }
}

/// Complete classifier configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Algorithm to build.
    pub algorithm: Algorithm,
    /// Weighted probability parameters.
    pub smoothing: Smoothing,
    /// Feature extraction policy.
    pub extractor: ExtractorConfig,
    /// Initial naive Bayes thresholds per category.
    pub thresholds: BTreeMap<String, f64>,
    /// Initial Fisher minimums per category.
    pub minimums: BTreeMap<String, f64>,
}

impl ClassifierConfig {
    /// Default configuration for `algorithm`.
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        ClassifierConfig {
            algorithm,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClassifierConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            DocclassError::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Check every value for a usable range.
    pub fn validate(&self) -> Result<()> {
        let Smoothing {
            weight,
            assumed_prob,
        } = self.smoothing;

        if !weight.is_finite() || weight < 0.0 {
            return Err(DocclassError::config(format!(
                "smoothing weight must be a non-negative number, got {weight}"
            )));
        }
        if !(0.0..=1.0).contains(&assumed_prob) {
            return Err(DocclassError::config(format!(
                "assumed probability must be within [0, 1], got {assumed_prob}"
            )));
        }

        let extractor = &self.extractor;
        if extractor.min_length > extractor.max_length {
            return Err(DocclassError::config(format!(
                "extractor min_length {} exceeds max_length {}",
                extractor.min_length, extractor.max_length
            )));
        }
        Regex::new(&extractor.pattern).map_err(|e| {
            DocclassError::config(format!("invalid extractor pattern '{}': {e}", extractor.pattern))
        })?;

        for (table, values) in [("threshold", &self.thresholds), ("minimum", &self.minimums)] {
            if let Some((category, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
                return Err(DocclassError::config(format!(
                    "{table} for '{category}' must be finite, got {value}"
                )));
            }
        }

        Ok(())
    }

    /// Build the configured classifier over `store`.
    pub fn build(&self, store: Arc<dyn CountStore>) -> Result<Box<dyn DocumentClassifier>> {
        self.validate()?;

        let extractor = Arc::new(self.extractor.build()?);
        let base = Classifier::with_extractor(store, extractor).with_smoothing(self.smoothing);

        debug!(algorithm = %self.algorithm, scope = base.store().scope(), "building classifier");

        let classifier: Box<dyn DocumentClassifier> = match self.algorithm {
            Algorithm::NaiveBayes => {
                let mut classifier = NaiveBayesClassifier::new(base);
                for (category, threshold) in &self.thresholds {
                    classifier.set_threshold(category, *threshold)?;
                }
                Box::new(classifier)
            }
            Algorithm::ComplementNaiveBayes => Box::new(ComplementNaiveBayesClassifier::new(base)),
            Algorithm::Fisher => {
                let mut classifier = FisherClassifier::new(base);
                for (category, minimum) in &self.minimums {
                    classifier.set_minimum(category, *minimum)?;
                }
                Box::new(classifier)
            }
        };

        Ok(classifier)
    }
}
