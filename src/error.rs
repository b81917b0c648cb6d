//! Error taxonomy for the suitability engine
//!
//! Two kinds of failure exist: the request carried bad input, or the
//! configuration it was evaluated against is malformed (an inverted factor
//! range, a crop weight triple that does not sum to one). Both are fatal to
//! the single request and neither touches cache state.

use thiserror::Error;

/// Crate-wide result alias for engine operations
pub type Result<T> = std::result::Result<T, SuitabilityError>;

/// Error returned by every fallible engine operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SuitabilityError {
    /// Factor range with `min >= max`, malformed crop weights, bad province area
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Empty factor list, zero total weight, missing or non-finite values
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Coarse error category surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl SuitabilityError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        SuitabilityError::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        SuitabilityError::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SuitabilityError::Configuration(_) => ErrorKind::Configuration,
            SuitabilityError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Fixed message safe to show to end users (no request details)
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Configuration => "Invalid configuration",
            ErrorKind::InvalidInput => "Invalid input",
        }
    }
}

/// Reject NaN and infinities with an `InvalidInput` naming the field
pub(crate) fn require_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SuitabilityError::invalid_input(format!("{} must be a finite number, got {}", what, value)))
    }
}
