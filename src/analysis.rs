//! Text analysis for feature extraction.
//!
//! Raw item text flows through a [`Tokenizer`](tokenizer::Tokenizer) and a
//! chain of [`Filter`](token_filter::Filter)s assembled by an
//! [`Analyzer`](analyzer::Analyzer). The default word extractor in
//! [`crate::features`] is one such pipeline.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
