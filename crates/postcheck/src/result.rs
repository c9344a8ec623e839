//! Result and error types for Postcheck.

use std::fmt;
use thiserror::Error;

/// Result type for Postcheck operations
pub type CheckResult<T> = Result<T, CheckError>;

/// Errors that can occur while driving or verifying a post.
///
/// Every variant is fatal to a scenario run; nothing is retried at the
/// workflow level.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Required configuration missing or malformed
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Entry page never showed its login control
    #[error("Navigation to {url} timed out after {ms}ms waiting for the login control")]
    NavigationTimeout {
        /// URL that was loaded
        url: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// Authenticated-state marker never appeared.
    ///
    /// Wrong credentials and a slow server both end up here.
    #[error("Authentication timed out after {ms}ms waiting for the profile control")]
    AuthenticationTimeout {
        /// Bound in milliseconds
        ms: u64,
    },

    /// No list entry matched within the bound
    #[error("No record matching {criterion} appeared within {ms}ms")]
    RecordNotFound {
        /// Human readable lookup criterion
        criterion: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// More than one list entry matched the criterion
    #[error("Expected exactly one record matching {criterion}, found {count}")]
    AmbiguousMatch {
        /// Human readable lookup criterion
        criterion: String,
        /// Number of matches observed
        count: usize,
    },

    /// Attribute absent on an element that must carry it
    #[error("Element '{element}' has no '{attribute}' attribute")]
    MissingAttribute {
        /// Semantic element name
        element: String,
        /// Attribute name
        attribute: String,
    },

    /// A rendered field differs from the draft
    #[error("{rendering} {field} mismatch: expected {expected:?}, actual {actual:?}")]
    AssertionFailure {
        /// Rendering surface that was read
        rendering: String,
        /// Field name
        field: String,
        /// Expected value (from the draft)
        expected: String,
        /// Value read from the UI
        actual: String,
    },

    /// Query builder refused a value
    #[error("Refusing to embed {value:?} in a query: {reason}")]
    UnsafeQueryValue {
        /// Offending value
        value: String,
        /// Why it was refused
        reason: String,
    },

    /// Generic element readiness timeout
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the condition
        waited_for: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// Automation backend failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CheckError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl fmt::Display) -> Self {
        Self::Driver {
            message: message.to_string(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(
        rendering: impl fmt::Display,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionFailure {
            rendering: rendering.to_string(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this error came from a bounded wait elapsing
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. }
                | Self::AuthenticationTimeout { .. }
                | Self::RecordNotFound { .. }
                | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_carries_both_values() {
        let err = CheckError::assertion("detail", "summary", "Alpha summary.", "Beta");
        let msg = err.to_string();
        assert!(msg.contains("Alpha summary."));
        assert!(msg.contains("Beta"));
        assert!(msg.contains("detail summary"));
    }

    #[test]
    fn test_is_timeout() {
        assert!(CheckError::AuthenticationTimeout { ms: 10 }.is_timeout());
        assert!(CheckError::RecordNotFound {
            criterion: "x".into(),
            ms: 1
        }
        .is_timeout());
        assert!(!CheckError::configuration("missing").is_timeout());
        assert!(!CheckError::driver("boom").is_timeout());
    }
}
