//! Parsing error types
//!
//! Missing fields are never errors: they degrade to sentinels. What remains
//! are configuration problems that make a parser impossible to build.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("No valid selectors compiled for field '{field}' from {attempted} candidates")]
    NoValidSelectors { field: String, attempted: usize },

    #[error("Parsing configuration error: {message}")]
    ConfigurationError { message: String },
}

impl ParsingError {
    /// Create an invalid selector error
    pub fn invalid_selector(selector: &str, reason: impl ToString) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a no-valid-selectors error for a field
    pub fn no_valid_selectors(field: &str, attempted: usize) -> Self {
        Self::NoValidSelectors {
            field: field.to_string(),
            attempted,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
