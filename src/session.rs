//! Interactive session state
//!
//! Holds what a front end needs between user actions: the last fetched
//! snapshot and the articles generated from it. Articles are memoized per
//! `(keyword, tone, length)`; asking again returns the same text until the
//! caller explicitly regenerates or refreshes the data.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

use crate::generator::{ArticleGenerator, Length, Tone};
use crate::models::{TrendQuery, TrendsSnapshot};
use crate::provider::{FetchIssue, TrendsService};
use crate::utils::article_filename;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ArticleKey {
    keyword: String,
    tone: Tone,
    length: Length,
}

/// Explicit replacement for UI session globals
pub struct Session {
    service: TrendsService,
    generator: ArticleGenerator,
    snapshot: Option<TrendsSnapshot>,
    last_issues: Vec<FetchIssue>,
    articles: HashMap<ArticleKey, String>,
    /// Seeded stream shared by all generations of this session
    rng: Option<ChaCha8Rng>,
}

impl Session {
    pub fn new(service: TrendsService, generator: ArticleGenerator) -> Self {
        Self {
            service,
            generator,
            snapshot: None,
            last_issues: Vec::new(),
            articles: HashMap::new(),
            rng: None,
        }
    }

    /// Make every generated article reproducible from `seed`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    /// Fetch fresh data for `query`, replacing the snapshot and dropping
    /// articles generated from the previous one.
    ///
    /// Returns the non-fatal issues hit while fetching.
    pub async fn refresh(&mut self, query: TrendQuery) -> &[FetchIssue] {
        let report = self.service.fetch_all(&query).await;

        self.snapshot = Some(report.snapshot);
        self.last_issues = report.issues;
        self.articles.clear();

        &self.last_issues
    }

    /// Install a snapshot obtained elsewhere (e.g. loaded from disk)
    pub fn load_snapshot(&mut self, snapshot: TrendsSnapshot) {
        self.snapshot = Some(snapshot);
        self.last_issues.clear();
        self.articles.clear();
    }

    pub fn snapshot(&self) -> Option<&TrendsSnapshot> {
        self.snapshot.as_ref()
    }

    /// Issues from the last refresh
    pub fn issues(&self) -> &[FetchIssue] {
        &self.last_issues
    }

    /// Previously generated article, if any
    pub fn cached_article(&self, keyword: &str, tone: Tone, length: Length) -> Option<&str> {
        let key = ArticleKey {
            keyword: keyword.to_string(),
            tone,
            length,
        };
        self.articles.get(&key).map(String::as_str)
    }

    /// Article for the selection, generating it on first request
    pub fn article(&mut self, keyword: &str, tone: Tone, length: Length) -> &str {
        let key = ArticleKey {
            keyword: keyword.to_string(),
            tone,
            length,
        };

        if !self.articles.contains_key(&key) {
            let text = self.compose(keyword, tone, length);
            self.articles.insert(key.clone(), text);
        }
        self.articles.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Generate a new article for the selection, replacing any cached one
    pub fn regenerate(&mut self, keyword: &str, tone: Tone, length: Length) -> &str {
        let text = self.compose(keyword, tone, length);
        let key = ArticleKey {
            keyword: keyword.to_string(),
            tone,
            length,
        };
        self.articles.insert(key.clone(), text);
        self.articles.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// File name the article about `keyword` is offered for download under
    pub fn download_filename(keyword: &str) -> String {
        article_filename(keyword)
    }

    fn compose(&mut self, keyword: &str, tone: Tone, length: Length) -> String {
        let topics = self.snapshot.as_ref().and_then(|s| s.topics_for(keyword));
        let queries = self.snapshot.as_ref().and_then(|s| s.queries_for(keyword));

        match self.rng.as_mut() {
            Some(rng) => self
                .generator
                .generate_with_rng(keyword, topics, queries, tone, length, rng),
            None => self.generator.generate(keyword, topics, queries, tone, length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Region, Timeframe};
    use crate::provider::SyntheticProvider;
    use std::sync::Arc;
    use std::time::Duration;

    fn session() -> Session {
        let service = TrendsService::new(Arc::new(SyntheticProvider::sample()), Duration::from_secs(5));
        Session::new(service, ArticleGenerator::new()).with_seed(11)
    }

    fn query() -> TrendQuery {
        TrendQuery::new(
            vec!["AI".into(), "machine learning".into()],
            Timeframe::PastSevenDays,
            Region::UnitedStates,
        )
    }

    #[tokio::test]
    async fn test_refresh_stores_snapshot() {
        let mut session = session();
        assert!(session.snapshot().is_none());

        let issues = session.refresh(query()).await;
        assert!(issues.is_empty());

        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.related_topics.len(), 2);
        assert!(!snapshot.interest.is_empty());
    }

    #[tokio::test]
    async fn test_article_is_memoized() {
        let mut session = session();
        session.refresh(query()).await;

        let first = session.article("AI", Tone::Informative, Length::Short).to_string();
        let second = session.article("AI", Tone::Informative, Length::Short).to_string();
        assert_eq!(first, second);
        assert!(session
            .cached_article("AI", Tone::Informative, Length::Long)
            .is_none());
    }

    #[tokio::test]
    async fn test_regenerate_replaces_cache() {
        let mut session = session();
        session.refresh(query()).await;

        session.article("AI", Tone::Analytical, Length::Long);
        let regenerated = session
            .regenerate("AI", Tone::Analytical, Length::Long)
            .to_string();
        assert_eq!(
            session.cached_article("AI", Tone::Analytical, Length::Long),
            Some(regenerated.as_str())
        );
    }

    #[tokio::test]
    async fn test_refresh_clears_articles() {
        let mut session = session();
        session.refresh(query()).await;
        session.article("AI", Tone::Informative, Length::Short);

        session.refresh(query()).await;
        assert!(session
            .cached_article("AI", Tone::Informative, Length::Short)
            .is_none());
    }

    #[test]
    fn test_article_without_snapshot_uses_fallbacks() {
        let mut session = session();
        let text = session
            .article("AI", Tone::Informative, Length::Long)
            .to_string();
        assert!(text.starts_with("# Trending Insights: Understanding the Rise of AI"));
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            Session::download_filename("data science"),
            "data_science_article.txt"
        );
    }
}
