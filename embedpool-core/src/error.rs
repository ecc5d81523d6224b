//! Error types for the embedpool core.
//!
//! One error enum covers every failure mode the group router can surface:
//! configuration problems, provider call failures, dispatch timeouts, and
//! retry exhaustion. Admission mismatch is deliberately *not* an error;
//! [`crate::group::ModelGroup::add_provider`] reports it as a boolean.

use thiserror::Error;

/// Core error types for embedpool.
#[derive(Error, Debug)]
pub enum EmbedPoolError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Configuration {
        /// Detailed error message
        message: String,
    },

    /// A remote provider call failed
    #[error("Provider error: {message}")]
    Provider {
        /// Detailed error message
        message: String,
    },

    /// A single dispatch attempt exceeded its fixed timeout
    #[error("Request timeout after {seconds} seconds")]
    Timeout {
        /// Timeout duration in seconds
        seconds: u64,
    },

    /// A chunk exhausted its retry budget; the whole batch call fails
    #[error("Retry limit exceeded after {attempts} attempts")]
    RetryLimitExceeded {
        /// Number of failed dispatch attempts
        attempts: usize,
    },

    /// Invalid default-provider index for the current pool size
    #[error("Provider index {index} out of range for pool of {len}")]
    IndexOutOfRange {
        /// The requested index
        index: usize,
        /// Current number of providers in the pool
        len: usize,
    },

    /// Resource not found errors (e.g. an unknown group name)
    #[error("Not found: {resource}")]
    NotFound {
        /// Name of the missing resource
        resource: String,
    },

    /// Two vectors of different lengths were compared
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector length
        expected: usize,
        /// Actual vector length
        actual: usize,
    },

    /// Input validation errors
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed error message
        message: String,
    },

    /// Internal invariant violations
    #[error("Internal error: {message}")]
    Internal {
        /// Detailed error message
        message: String,
    },

    /// Generic errors from external dependencies
    #[error("External error: {source}")]
    External {
        /// The underlying error
        #[source]
        source: anyhow::Error,
    },
}

impl EmbedPoolError {
    /// Create a new configuration error with a message.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new provider error with a message.
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new timeout error from a duration in seconds.
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a new not found error with a resource name.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new validation error with a message.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new internal error with a message.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new external error from any error that implements `Into<anyhow::Error>`.
    pub fn external<E: Into<anyhow::Error>>(error: E) -> Self {
        Self::External {
            source: error.into(),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Returns `true` for transient errors the scheduler recovers from by
    /// re-dispatching against another backend.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Timeout { .. })
    }
}

/// Convert from `anyhow::Error` to `EmbedPoolError`.
impl From<anyhow::Error> for EmbedPoolError {
    fn from(error: anyhow::Error) -> Self {
        Self::External { source: error }
    }
}

/// Result type alias for convenience.
///
/// This is the standard result type used throughout embedpool.
pub type Result<T> = std::result::Result<T, EmbedPoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = EmbedPoolError::provider("connection reset");
        assert!(matches!(err, EmbedPoolError::Provider { .. }));
        assert_eq!(err.to_string(), "Provider error: connection reset");

        let err = EmbedPoolError::timeout(10);
        assert_eq!(err.to_string(), "Request timeout after 10 seconds");
    }

    #[test]
    fn test_error_retryable() {
        assert!(EmbedPoolError::timeout(10).is_retryable());
        assert!(EmbedPoolError::provider("503").is_retryable());
        assert!(!EmbedPoolError::configuration("bad threshold").is_retryable());
        assert!(!EmbedPoolError::RetryLimitExceeded { attempts: 11 }.is_retryable());
        assert!(
            !EmbedPoolError::IndexOutOfRange { index: 5, len: 2 }.is_retryable()
        );
    }
}
