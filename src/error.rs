//! Unified error handling for the trendscribe crate
//!
//! Domain modules keep their own error types ([`FetchError`], [`ParseError`],
//! [`ProviderError`], [`GeneratorError`], [`TrendError`]). This module wraps
//! them in a single [`Error`] for code that crosses module boundaries, and
//! classifies every error into an [`ErrorCategory`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use trendscribe::error::{Error, TrendscribeErrorTrait};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         eprintln!("[{}] retry later: {err}", err.category());
//!     } else {
//!         eprintln!("[{}] {err}", err.category());
//!     }
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

pub use crate::analytics::TrendError;
pub use crate::generator::GeneratorError;
pub use crate::provider::ProviderError;
pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for all trendscribe error types
pub trait TrendscribeErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Payload decoding errors
    Parsing,
    /// Template catalog errors
    Templates,
    /// File output errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Analysis over fetched data
    Analysis,
    /// Other/unknown errors
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Templates => "templates",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Analysis => "analysis",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

/// Unified error type for the trendscribe crate
#[derive(Error, Debug)]
pub enum Error {
    /// Trend backend errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Template catalog errors
    #[error("Template error: {0}")]
    Generator(#[from] GeneratorError),

    /// Trend analysis errors
    #[error("Analysis error: {0}")]
    Trend(#[from] TrendError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Errors raised through `anyhow` context chains
    #[error("{0}")]
    Other(String),
}

impl TrendscribeErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_recoverable(),
            Self::Fetch(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Parse(_)
            | Self::Generator(_)
            | Self::Trend(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Provider(ProviderError::Parse(_)) | Self::Parse(_) | Self::Json(_) => {
                ErrorCategory::Parsing
            }
            Self::Provider(ProviderError::InvalidQuery(_)) => ErrorCategory::Config,
            Self::Provider(_) | Self::Fetch(_) => ErrorCategory::Network,
            Self::Generator(GeneratorError::Io { .. }) | Self::Io(_) => ErrorCategory::Storage,
            Self::Generator(_) => ErrorCategory::Templates,
            Self::Trend(_) => ErrorCategory::Analysis,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
