//! Lenient front for trend backends
//!
//! Callers of [`TrendsService`] never see an error: every backend call is
//! bounded by a timeout, and a failed or timed-out call yields an empty value.
//! Related tables are fetched per keyword (concurrently) so a failing keyword
//! only empties its own entry. `fetch_all` additionally reports what went wrong as
//! [`FetchIssue`]s for display as non-fatal notices.

use chrono::Utc;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{ProviderError, ProviderResult, TrendDataProvider};
use crate::models::{
    InterestOverTime, RegionInterest, RelationKind, RelationTable, Resolution, TrendQuery,
    TrendsSnapshot,
};

/// Which service call an issue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOperation {
    InterestOverTime,
    RelatedTopics,
    RelatedQueries,
    InterestByRegion,
}

impl fmt::Display for FetchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InterestOverTime => write!(f, "interest over time"),
            Self::RelatedTopics => write!(f, "related topics"),
            Self::RelatedQueries => write!(f, "related queries"),
            Self::InterestByRegion => write!(f, "interest by region"),
        }
    }
}

/// A call that failed and was replaced by an empty result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIssue {
    pub operation: FetchOperation,
    /// Set for per-keyword calls
    pub keyword: Option<String>,
    pub message: String,
}

impl fmt::Display for FetchIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyword {
            Some(keyword) => write!(f, "{} for '{keyword}': {}", self.operation, self.message),
            None => write!(f, "{}: {}", self.operation, self.message),
        }
    }
}

/// Snapshot plus the issues hit while building it
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub snapshot: TrendsSnapshot,
    pub issues: Vec<FetchIssue>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Timeout-bounded, never-failing access to a trend backend
#[derive(Clone)]
pub struct TrendsService {
    provider: Arc<dyn TrendDataProvider>,
    timeout: Duration,
}

impl TrendsService {
    pub fn new(provider: Arc<dyn TrendDataProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `call` under the deadline
    async fn bounded<T, F>(&self, call: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(ProviderError::TimedOut(self.timeout)))
    }

    fn issue(
        &self,
        operation: FetchOperation,
        keyword: Option<&str>,
        error: &ProviderError,
    ) -> FetchIssue {
        warn!(
            provider = self.provider.name(),
            operation = %operation,
            keyword = keyword.unwrap_or_default(),
            error = %error,
            "Trend fetch failed, using empty result"
        );
        FetchIssue {
            operation,
            keyword: keyword.map(str::to_string),
            message: error.to_string(),
        }
    }

    async fn interest_checked(&self, query: &TrendQuery) -> Result<InterestOverTime, FetchIssue> {
        if query.keywords.is_empty() {
            return Ok(InterestOverTime::default());
        }

        self.bounded(self.provider.interest_over_time(query))
            .await
            .map_err(|e| self.issue(FetchOperation::InterestOverTime, None, &e))
    }

    async fn related_checked(
        &self,
        query: &TrendQuery,
        kind: RelationKind,
    ) -> (BTreeMap<String, RelationTable>, Vec<FetchIssue>) {
        let operation = match kind {
            RelationKind::Topics => FetchOperation::RelatedTopics,
            RelationKind::Queries => FetchOperation::RelatedQueries,
        };

        // one request per keyword, issued together; the backend's rate limiter paces them
        let calls = query.keywords.iter().map(|keyword| async move {
            let call = self
                .provider
                .related(keyword, kind, query.timeframe, query.region);
            (keyword, self.bounded(call).await)
        });

        let mut tables = BTreeMap::new();
        let mut issues = Vec::new();

        for (keyword, result) in futures::future::join_all(calls).await {
            let table = match result {
                Ok(table) => table,
                Err(e) => {
                    issues.push(self.issue(operation, Some(keyword.as_str()), &e));
                    RelationTable::default()
                }
            };
            tables.insert(keyword.clone(), table);
        }

        (tables, issues)
    }

    /// Interest over time; empty table on failure
    pub async fn interest_over_time(&self, query: &TrendQuery) -> InterestOverTime {
        self.interest_checked(query).await.unwrap_or_default()
    }

    /// Related topics per keyword; failing keywords map to an empty table
    pub async fn related_topics(&self, query: &TrendQuery) -> BTreeMap<String, RelationTable> {
        self.related_checked(query, RelationKind::Topics).await.0
    }

    /// Related queries per keyword; failing keywords map to an empty table
    pub async fn related_queries(&self, query: &TrendQuery) -> BTreeMap<String, RelationTable> {
        self.related_checked(query, RelationKind::Queries).await.0
    }

    /// Interest by area; empty on failure
    pub async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> RegionInterest {
        if query.keywords.is_empty() {
            return RegionInterest::default();
        }

        self.bounded(self.provider.interest_by_region(query, resolution))
            .await
            .unwrap_or_else(|e| {
                self.issue(FetchOperation::InterestByRegion, None, &e);
                RegionInterest::default()
            })
    }

    /// Fetch interest and both relation maps for `query`
    pub async fn fetch_all(&self, query: &TrendQuery) -> FetchReport {
        let mut issues = Vec::new();

        let interest = self.interest_checked(query).await.unwrap_or_else(|issue| {
            issues.push(issue);
            InterestOverTime::default()
        });

        let (related_topics, topic_issues) = self.related_checked(query, RelationKind::Topics).await;
        issues.extend(topic_issues);

        let (related_queries, query_issues) =
            self.related_checked(query, RelationKind::Queries).await;
        issues.extend(query_issues);

        info!(
            provider = self.provider.name(),
            keywords = query.keywords.len(),
            rows = interest.len(),
            issues = issues.len(),
            "Trends fetch finished"
        );

        FetchReport {
            snapshot: TrendsSnapshot {
                query: query.clone(),
                fetched_at: Utc::now(),
                interest,
                related_topics,
                related_queries,
            },
            issues,
        }
    }
}
