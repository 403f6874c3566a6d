//! Transport and payload error types
//!
//! These are the low-level failures a trends backend can hit. They never reach
//! the article generator: `TrendsService` turns them into empty results.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => *status == 429 || (500..600).contains(status),
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while decoding a trends payload
#[derive(Error, Debug)]
pub enum ParseError {
    /// Body was not valid JSON after prefix stripping
    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The explore response did not contain the requested widget
    #[error("Widget not found in explore response: {0}")]
    WidgetNotFound(String),

    /// JSON was valid but did not have the expected structure
    #[error("Unexpected payload shape: {0}")]
    UnexpectedShape(String),

    /// Timestamp field could not be interpreted
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_recoverable() {
        assert!(FetchError::RateLimit.is_recoverable());
        assert!(FetchError::Timeout.is_recoverable());
        assert!(FetchError::ServerError(503).is_recoverable());
        assert!(FetchError::ServerError(501).is_recoverable());
        assert!(FetchError::ServerError(599).is_recoverable());
        assert!(!FetchError::ServerError(404).is_recoverable());
        assert!(!FetchError::ServerError(600).is_recoverable());
        assert!(!FetchError::InvalidUrl("x".into()).is_recoverable());
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::WidgetNotFound("RELATED_TOPICS".to_string());
        assert!(err.to_string().contains("RELATED_TOPICS"));
    }
}
