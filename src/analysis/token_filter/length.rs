//! Length filter implementation.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{DocclassError, Result};

/// A filter that keeps tokens whose character length lies in `min..=max`.
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min: usize,
    max: usize,
}

impl LengthFilter {
    /// Create a new length filter with inclusive bounds.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min > max {
            return Err(DocclassError::invalid_argument(format!(
                "length filter minimum {min} exceeds maximum {max}"
            )));
        }
        Ok(LengthFilter { min, max })
    }

    /// Get the minimum length.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Get the maximum length.
    pub fn max(&self) -> usize {
        self.max
    }
}

impl Filter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let (min, max) = (self.min, self.max);
        let kept: Vec<Token> = tokens
            .filter(|token| {
                let len = token.char_len();
                len >= min && len <= max
            })
            .collect();
        Ok(Box::new(kept.into_iter()))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}
