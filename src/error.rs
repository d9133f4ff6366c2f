//! Error types for the docclass library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`DocclassError`] enum. The variants mirror the failure classes a caller
//! has to tell apart: an untrained model, a failing count store, and numeric
//! input that has no defined answer.
//!
//! # Examples
//!
//! ```
//! use docclass::error::{DocclassError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(DocclassError::invalid_state("no category has been trained"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for docclass operations.
#[derive(Error, Debug)]
pub enum DocclassError {
    /// A probability was requested from a model that has not been trained.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The count store could not complete a read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A numeric routine received input with no defined result.
    #[error("Numeric error: {0}")]
    NumericDegenerate(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// A string did not name one of the allowed choices.
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors (snapshot files, input files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with DocclassError.
pub type Result<T> = std::result::Result<T, DocclassError>;

impl DocclassError {
    /// Create a new invalid state error.
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        DocclassError::InvalidState(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        DocclassError::Storage(msg.into())
    }

    /// Create a new numeric error.
    pub fn numeric<S: Into<String>>(msg: S) -> Self {
        DocclassError::NumericDegenerate(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        DocclassError::Analysis(msg.into())
    }

    /// Create a new invalid choice error.
    pub fn invalid_choice<S: Into<String>>(msg: S) -> Self {
        DocclassError::InvalidChoice(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DocclassError::Config(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DocclassError::InvalidArgument(msg.into())
    }

    /// Whether this error means the model has no training data yet.
    pub fn is_untrained(&self) -> bool {
        matches!(self, DocclassError::InvalidState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = DocclassError::invalid_state("nothing trained");
        assert_eq!(error.to_string(), "Invalid state: nothing trained");

        let error = DocclassError::storage("store closed");
        assert_eq!(error.to_string(), "Storage error: store closed");

        let error = DocclassError::numeric("dof must be >= 2");
        assert_eq!(error.to_string(), "Numeric error: dof must be >= 2");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = DocclassError::from(io_error);

        match error {
            DocclassError::Io(_) => {}
            _ => panic!("Expected IO error"),
        }
    }

    #[test]
    fn test_is_untrained() {
        assert!(DocclassError::invalid_state("x").is_untrained());
        assert!(!DocclassError::storage("x").is_untrained());
    }
}
