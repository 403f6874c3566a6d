pub mod fetch;
pub mod generate;
pub mod tones;

// Re-export command functions for convenience
pub use fetch::{fetch, FetchParams};
pub use generate::{generate, GenerateParams};
pub use tones::tones;

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use trendscribe::config::Config;
use trendscribe::generator::{ArticleGenerator, TemplateCatalog};
use trendscribe::models::{Region, Timeframe, TrendQuery};
use trendscribe::provider::{build_provider, TrendsService, MAX_KEYWORDS_PER_QUERY};
use trendscribe::utils::split_keywords;

/// Trends service over the backend selected in `config`
pub(crate) fn build_service(config: &Config) -> trendscribe::Result<TrendsService> {
    let provider = build_provider(&config.provider)?;
    Ok(TrendsService::new(provider, config.request_timeout()))
}

/// Generator over the configured catalog, or the built-in one
pub(crate) fn build_generator(config: &Config) -> trendscribe::Result<ArticleGenerator> {
    match &config.generator.templates_path {
        Some(path) => {
            let catalog = TemplateCatalog::from_file(path)?;
            Ok(ArticleGenerator::with_catalog(Arc::new(catalog)))
        }
        None => Ok(ArticleGenerator::new()),
    }
}

/// Parse CLI keyword, timeframe and region arguments into a query
pub(crate) fn build_query(keywords: &str, timeframe: &str, region: &str) -> Result<TrendQuery> {
    let keywords = split_keywords(keywords);
    if keywords.is_empty() {
        bail!("Please enter at least one keyword");
    }
    if keywords.len() > MAX_KEYWORDS_PER_QUERY {
        bail!(
            "At most {MAX_KEYWORDS_PER_QUERY} keywords can be compared, got {}",
            keywords.len()
        );
    }

    let timeframe = Timeframe::parse(timeframe)
        .with_context(|| format!("Unknown timeframe: {timeframe} (see `trendscribe tones`)"))?;
    let region = Region::parse(region)
        .with_context(|| format!("Unknown region: {region} (see `trendscribe tones`)"))?;

    Ok(TrendQuery::new(keywords, timeframe, region))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query() {
        let query = build_query("AI, machine learning,", "past-7-days", "US").unwrap();
        assert_eq!(query.keywords, vec!["AI", "machine learning"]);
        assert_eq!(query.timeframe, Timeframe::PastSevenDays);
        assert_eq!(query.region, Region::UnitedStates);
    }

    #[test]
    fn test_build_query_rejects_bad_input() {
        assert!(build_query(" , ", "past-7-days", "US").is_err());
        assert!(build_query("a,b,c,d,e,f", "past-7-days", "US").is_err());
        assert!(build_query("AI", "yesterday", "US").is_err());
        assert!(build_query("AI", "past-7-days", "Atlantis").is_err());
    }

    #[test]
    fn test_build_generator_missing_templates() {
        let mut config = Config::default();
        config.generator.templates_path = Some("/nonexistent/templates.toml".into());
        assert!(build_generator(&config).is_err());
    }
}
