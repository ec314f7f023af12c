//! Error types for the sieve crate.

use thiserror::Error;

/// Errors raised while comparing two values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    /// The two values have no ordering between them.
    #[error("cannot compare {left} value with {right} value")]
    IncompatibleKinds {
        left: &'static str,
        right: &'static str,
    },

    /// A list operand was given to an operator that needs a single value.
    #[error("operator '{op}' does not accept a list operand")]
    ListOperand { op: &'static str },
}

/// Errors raised while building a query, before any item is scanned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The property path is not registered in the property map.
    #[error("unknown property path '{path}'")]
    UnknownProperty { path: String },

    /// The property path was registered twice.
    #[error("property path '{path}' is already registered")]
    DuplicateProperty { path: String },

    /// A wildcard pattern could not be compiled.
    #[error("invalid wildcard pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors that can occur when building or executing queries.
#[derive(Debug, Error)]
pub enum SieveError {
    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl From<regex::Error> for SieveError {
    fn from(err: regex::Error) -> Self {
        SieveError::Configuration(ConfigurationError::InvalidPattern(err))
    }
}

/// Result type for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
