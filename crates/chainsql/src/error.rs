//! Error types for chainsql

use thiserror::Error;

/// Result type alias for chainsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while composing, rendering or running SQL fragments
#[derive(Debug, Error)]
pub enum SqlError {
    /// A mandatory clause is absent (no columns, no table, no rows, no parts)
    #[error("{0}")]
    Missing(String),

    /// A concatenation part is neither a string literal nor a fragment
    #[error("{0} is not a string or SQL fragment")]
    InvalidConcatPart(String),

    /// Comparison or LIKE predicate given a NULL operand
    #[error("cannot use null with {0} operators")]
    NullOperand(&'static str),

    /// Comparison or LIKE predicate given an array operand
    #[error("cannot use array or slice with {0} operators")]
    ListOperand(&'static str),

    /// A template was given more fragment arguments than it has markers
    #[error("template has fragment arguments but no placeholder left to hold them")]
    UnusedFragment,

    /// Placeholder count and argument count disagree (debug rendering)
    #[error("placeholder mismatch: {markers} placeholders, {args} arguments")]
    PlaceholderMismatch { markers: usize, args: usize },

    /// No execution collaborator has been configured
    #[error("cannot run; runner not set")]
    RunnerNotSet,

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Errors raised by user-defined fragments
    #[error("{0}")]
    Custom(String),
}

impl SqlError {
    /// Create a structural precondition error
    pub fn missing(message: impl Into<String>) -> Self {
        Self::Missing(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create an error for a user-defined fragment
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Check if this is a structural precondition error
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Check if this is the "runner not set" sentinel
    pub fn is_runner_not_set(&self) -> bool {
        matches!(self, Self::RunnerNotSet)
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operand_messages() {
        assert_eq!(
            SqlError::NullOperand("less than or greater than").to_string(),
            "cannot use null with less than or greater than operators"
        );
        assert_eq!(
            SqlError::ListOperand("like").to_string(),
            "cannot use array or slice with like operators"
        );
    }

    #[test]
    fn sentinel_is_recognizable() {
        let err = SqlError::RunnerNotSet;
        assert!(err.is_runner_not_set());
        assert_eq!(err.to_string(), "cannot run; runner not set");
    }
}
