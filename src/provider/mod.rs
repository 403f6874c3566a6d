//! Trend data providers
//!
//! All backends implement [`TrendDataProvider`]. The strict trait methods
//! return errors; [`TrendsService`] wraps any backend with timeouts and turns
//! failures into empty results for callers that must not fail.

pub mod google;
pub mod service;
pub mod synthetic;

pub use google::GoogleTrendsProvider;
pub use service::{FetchIssue, FetchOperation, FetchReport, TrendsService};
pub use synthetic::SyntheticProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::models::{
    InterestOverTime, Region, RegionInterest, RelationKind, RelationTable, Resolution, Timeframe,
    TrendQuery,
};
use crate::utils::error::{FetchError, ParseError};

/// Most keywords a single comparison request may carry
pub const MAX_KEYWORDS_PER_QUERY: usize = 5;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors a backend can report
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The query cannot be sent as is
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The call did not finish within the caller's deadline
    #[error("Provider call timed out after {0:?}")]
    TimedOut(std::time::Duration),
}

impl ProviderError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::TimedOut(_) => true,
            Self::Parse(_) | Self::InvalidQuery(_) => false,
        }
    }
}

/// Source of trend data
#[async_trait]
pub trait TrendDataProvider: Send + Sync {
    /// Backend name, used in logs
    fn name(&self) -> &str;

    /// Interest scores over time, one column per keyword
    async fn interest_over_time(&self, query: &TrendQuery) -> ProviderResult<InterestOverTime>;

    /// Related topics or queries for a single keyword
    async fn related(
        &self,
        keyword: &str,
        kind: RelationKind,
        timeframe: Timeframe,
        region: Region,
    ) -> ProviderResult<RelationTable>;

    /// Interest broken down by area
    async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> ProviderResult<RegionInterest>;
}

/// Available backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Live trends service
    #[default]
    Google,
    /// Deterministic sample data derived from the query
    Sample,
    /// Unseeded random placeholder data
    Random,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Sample => "sample",
            Self::Random => "random",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "live" => Some(Self::Google),
            "sample" => Some(Self::Sample),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Build the backend selected in `config`
pub fn build_provider(config: &ProviderConfig) -> ProviderResult<Arc<dyn TrendDataProvider>> {
    let provider: Arc<dyn TrendDataProvider> = match config.kind {
        ProviderKind::Google => Arc::new(GoogleTrendsProvider::new(config)?),
        ProviderKind::Sample => Arc::new(SyntheticProvider::sample()),
        ProviderKind::Random => Arc::new(SyntheticProvider::random()),
    };

    tracing::debug!(provider = provider.name(), "Trend data provider ready");
    Ok(provider)
}

/// Reject queries no backend can answer
pub(crate) fn check_query(query: &TrendQuery) -> ProviderResult<()> {
    if query.keywords.is_empty() {
        return Err(ProviderError::InvalidQuery("no keywords given".to_string()));
    }
    if query.keywords.len() > MAX_KEYWORDS_PER_QUERY {
        return Err(ProviderError::InvalidQuery(format!(
            "at most {MAX_KEYWORDS_PER_QUERY} keywords can be compared, got {}",
            query.keywords.len()
        )));
    }
    if query.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ProviderError::InvalidQuery("empty keyword".to_string()));
    }
    if let Some((i, keyword)) = query
        .keywords
        .iter()
        .enumerate()
        .find(|(i, k)| query.keywords[..*i].contains(k))
    {
        return Err(ProviderError::InvalidQuery(format!(
            "keyword '{keyword}' is repeated at position {}",
            i + 1
        )));
    }
    Ok(())
}
