//! Telegram client error types

use std::time::Duration;
use thiserror::Error;

/// Errors from the Telegram data API client
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The submitted link matched no accepted channel-link form
    #[error("Invalid Telegram channel link format: {0}")]
    InvalidLink(String),

    /// A single attempt was throttled (HTTP 429); retried internally
    #[error("Throttled by upstream, retry after {retry_after:?}")]
    Throttled { retry_after: Option<Duration> },

    /// The retry budget was exhausted on throttled attempts
    #[error("Rate limited after {attempts} attempts, retry after {retry_after:?}")]
    RateLimited { attempts: u32, retry_after: Duration },

    /// Upstream returned a non-429 error status
    #[error("Upstream error {status}: {message}")]
    Api { status: u16, message: String },

    /// Request was sent but no response arrived (timeout, connection loss)
    #[error("No response from upstream: {0}")]
    NoResponse(String),

    /// The request could not be constructed locally
    #[error("Request error: {0}")]
    Request(String),

    /// The response body did not decode into the expected shape
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TelegramError {
    /// Check if this is a rate limit error (single-attempt or budget-exhausted)
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::Throttled { .. } | Self::RateLimited { .. })
    }

    /// Get the retry duration if one is known
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Throttled { retry_after } => *retry_after,
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}
