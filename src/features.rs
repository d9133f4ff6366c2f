//! Feature extraction: item text to a set of distinct features.
//!
//! Classifiers never tokenize on their own; they hold an
//! `Arc<dyn FeatureExtractor>` and can be given any implementation.
//!
//! - [`WordFeatureExtractor`] - the default word policy
//! - [`AnalyzerFeatureExtractor`] - any [`Analyzer`] pipeline
//! - [`FnFeatureExtractor`] - a plain function or closure
//!
//! # Examples
//!
//! ```
//! use docclass::features::{FeatureExtractor, WordFeatureExtractor};
//!
//! let extractor = WordFeatureExtractor::new();
//! let features = extractor.extract("The quick rabbit jumps the fences").unwrap();
//!
//! let expected = ["fences", "jumps", "quick", "rabbit", "the"];
//! assert_eq!(features.iter().map(String::as_str).collect::<Vec<_>>(), expected);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::length::LengthFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::error::Result;

/// An opaque feature token.
pub type Feature = String;

/// Distinct features of one item, in sorted order.
pub type FeatureSet = BTreeSet<Feature>;

/// Shortest feature the default policy keeps (in characters).
pub const DEFAULT_MIN_LENGTH: usize = 3;

/// Longest feature the default policy keeps (in characters).
pub const DEFAULT_MAX_LENGTH: usize = 19;

/// Maps an item to its set of distinct features.
///
/// Implementations must be deterministic and free of side effects.
pub trait FeatureExtractor: Send + Sync {
    /// Extract the distinct features of `item`.
    fn extract(&self, item: &str) -> Result<FeatureSet>;

    /// Name used in logs and debug output.
    fn name(&self) -> &str;
}

/// Extracts features by running an analyzer and collecting token texts.
#[derive(Clone)]
pub struct AnalyzerFeatureExtractor {
    analyzer: Arc<dyn Analyzer>,
}

impl AnalyzerFeatureExtractor {
    /// Wrap an analyzer.
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        AnalyzerFeatureExtractor { analyzer }
    }

    /// Get the wrapped analyzer.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }
}

impl FeatureExtractor for AnalyzerFeatureExtractor {
    fn extract(&self, item: &str) -> Result<FeatureSet> {
        Ok(self.analyzer.analyze(item)?.map(|token| token.text).collect())
    }

    fn name(&self) -> &str {
        self.analyzer.name()
    }
}

impl fmt::Debug for AnalyzerFeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerFeatureExtractor")
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

/// The default word policy.
///
/// Runs of word characters become tokens, tokens are lower-cased, and only
/// tokens of 3 to 19 characters are kept.
#[derive(Clone, Debug)]
pub struct WordFeatureExtractor {
    inner: AnalyzerFeatureExtractor,
}

impl WordFeatureExtractor {
    /// Create the default word extractor.
    pub fn new() -> Self {
        let tokenizer = RegexTokenizer::default();
        let length = LengthFilter::new(DEFAULT_MIN_LENGTH, DEFAULT_MAX_LENGTH)
            .expect("default length bounds should be ordered");
        Self::from_parts(tokenizer, length, true)
    }

    /// Create a word extractor with a custom pattern and length window.
    pub fn with_options(
        pattern: &str,
        min_length: usize,
        max_length: usize,
        lowercase: bool,
    ) -> Result<Self> {
        let tokenizer = RegexTokenizer::with_pattern(pattern)?;
        let length = LengthFilter::new(min_length, max_length)?;
        Ok(Self::from_parts(tokenizer, length, lowercase))
    }

    /// Create a word extractor that splits on `separator` matches instead.
    ///
    /// `\W+` splits on runs of non-word characters, which yields the same words
    /// as the default pattern.
    pub fn with_separator(
        separator: &str,
        min_length: usize,
        max_length: usize,
        lowercase: bool,
    ) -> Result<Self> {
        let tokenizer = RegexTokenizer::with_gaps(separator)?;
        let length = LengthFilter::new(min_length, max_length)?;
        Ok(Self::from_parts(tokenizer, length, lowercase))
    }

    fn from_parts(tokenizer: RegexTokenizer, length: LengthFilter, lowercase: bool) -> Self {
        let mut analyzer = PipelineAnalyzer::new(Arc::new(tokenizer));
        if lowercase {
            analyzer = analyzer.add_filter(Arc::new(LowercaseFilter::new()));
        }
        let analyzer = analyzer.add_filter(Arc::new(length)).with_name("words");

        WordFeatureExtractor {
            inner: AnalyzerFeatureExtractor::new(Arc::new(analyzer)),
        }
    }
}

impl Default for WordFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for WordFeatureExtractor {
    fn extract(&self, item: &str) -> Result<FeatureSet> {
        self.inner.extract(item)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Adapts a function or closure into a [`FeatureExtractor`].
///
/// ```
/// use docclass::features::{FeatureExtractor, FeatureSet, FnFeatureExtractor};
///
/// let chars = FnFeatureExtractor::new("chars", |item: &str| -> FeatureSet {
///     item.chars().map(|c| c.to_string()).collect()
/// });
/// assert_eq!(chars.extract("aba").unwrap().len(), 2);
/// ```
pub struct FnFeatureExtractor<F> {
    name: String,
    func: F,
}

impl<F> FnFeatureExtractor<F>
where
    F: Fn(&str) -> FeatureSet + Send + Sync,
{
    /// Wrap `func` under the given name.
    pub fn new<S: Into<String>>(name: S, func: F) -> Self {
        FnFeatureExtractor {
            name: name.into(),
            func,
        }
    }
}

impl<F> FeatureExtractor for FnFeatureExtractor<F>
where
    F: Fn(&str) -> FeatureSet + Send + Sync,
{
    fn extract(&self, item: &str) -> Result<FeatureSet> {
        Ok((self.func)(item))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnFeatureExtractor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFeatureExtractor")
            .field("name", &self.name)
            .finish()
    }
}
