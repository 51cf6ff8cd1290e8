//! Error types for the structural validator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Cannot read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTML parse error: {0}")]
    Parse(String),

    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

pub type ValidatorResult<T> = Result<T, ValidatorError>;
