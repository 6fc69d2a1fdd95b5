//! Assessment service error types

use std::time::Duration;
use thiserror::Error;

/// Errors from the external assessment service
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("Assessment service rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Assessment API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response text could not be coerced into the fixed verdict schema
    #[error("Malformed assessment response: {0}")]
    MalformedVerdict(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AssessError {
    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Check if this error is worth retrying within the client's own budget
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::Network(_) => true,
            Self::MalformedVerdict(_) => false,
            Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(
            AssessError::ApiError {
                status: 503,
                message: "unavailable".to_string()
            }
            .is_retryable()
        );
        assert!(
            !AssessError::ApiError {
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );
        assert!(!AssessError::MalformedVerdict("not json".to_string()).is_retryable());
    }

    #[test]
    fn test_is_rate_limit() {
        assert!(
            AssessError::RateLimited {
                retry_after: Duration::from_secs(30)
            }
            .is_rate_limit()
        );
        assert!(!AssessError::Config("missing key".to_string()).is_rate_limit());
    }
}
