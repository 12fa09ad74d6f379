//! Faults that abort a validation call.

use std::error::Error as StdError;

use crate::error::SchemaError;

/// An error raised by consumer code running inside a rule.
///
/// Custom predicates, transforms and dynamic message functions return
/// `Result<_, RuleError>`. A `RuleError` is a bug in that code, not a data
/// problem: it aborts the whole validation call and is never turned into a
/// report message.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RuleError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl RuleError {
    /// Creates a rule error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping its message.
    pub fn from_source(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for RuleError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for RuleError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<Box<dyn StdError + Send + Sync>> for RuleError {
    fn from(source: Box<dyn StdError + Send + Sync>) -> Self {
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

/// Everything that aborts a validation call instead of producing a report.
///
/// The original error is carried unmodified; partially collected field
/// results of the aborted call are discarded.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// A custom predicate, transform or dynamic message failed.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// A parameter resolved at execution time cannot be used by its rule.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ExecutionError {
    /// Returns the rule error, if this is one.
    pub fn as_rule(&self) -> Option<&RuleError> {
        match self {
            ExecutionError::Rule(err) => Some(err),
            ExecutionError::Schema(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_message_is_kept() {
        let err = RuleError::new("Validation rule bug");
        assert_eq!(err.to_string(), "Validation rule bug");

        let wrapped = ExecutionError::from(err);
        assert_eq!(wrapped.to_string(), "Validation rule bug");
        assert!(wrapped.as_rule().is_some());
    }

    #[test]
    fn test_rule_error_from_source() {
        let parse = "x".parse::<i64>().unwrap_err();
        let err = RuleError::from_source(parse);
        assert!(err.source().is_some());
        assert_eq!(err.message(), "invalid digit found in string");
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err = ExecutionError::from(SchemaError::EmptyOneOf);
        assert_eq!(err.to_string(), SchemaError::EmptyOneOf.to_string());
        assert!(err.as_rule().is_none());
    }
}
