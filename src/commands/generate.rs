use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use trendscribe::config::Config;
use trendscribe::generator::{Length, Tone};
use trendscribe::session::Session;
use trendscribe::storage::{load_snapshot, ArticleWriter, SaveOutcome};

use super::{build_generator, build_query, build_service};

pub struct GenerateParams {
    /// Comma separated keywords whose trends are fetched; ignored with `snapshot`
    pub keywords: String,
    /// Keyword the article is about; defaults to the first fetched keyword
    pub keyword: Option<String>,
    pub timeframe: String,
    pub region: String,
    pub tone: Option<String>,
    pub length: Option<String>,
    pub seed: Option<u64>,
    /// Reuse a saved snapshot instead of fetching
    pub snapshot: Option<PathBuf>,
    pub save: bool,
    pub quiet: bool,
}

pub async fn generate(config: Config, params: GenerateParams) -> Result<()> {
    let tone: Tone = match params.tone.as_deref() {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => config.generator.default_tone,
    };
    let length: Length = match params.length.as_deref() {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => config.generator.default_length,
    };

    let mut session = Session::new(build_service(&config)?, build_generator(&config)?);
    if let Some(seed) = params.seed.or(config.generator.seed) {
        session = session.with_seed(seed);
    }

    let keyword = match &params.snapshot {
        Some(path) => {
            let snapshot = load_snapshot(path)?;
            tracing::info!(path = %path.display(), "Using saved snapshot");
            let keyword = resolve_keyword(params.keyword.as_deref(), &snapshot.query.keywords)?;
            session.load_snapshot(snapshot);
            keyword
        }
        None => {
            let query = build_query(&params.keywords, &params.timeframe, &params.region)?;
            let keyword = resolve_keyword(params.keyword.as_deref(), &query.keywords)?;
            for issue in session.refresh(query).await {
                eprintln!("Warning: error fetching {issue}");
            }
            keyword
        }
    };

    tracing::info!(keyword = %keyword, tone = %tone, length = %length, "Generating article");
    let article = session.article(&keyword, tone, length).to_string();

    if !params.quiet {
        println!("{article}");
    }

    if params.save {
        let writer = ArticleWriter::new(&config.output.dir, config.output.skip_existing)?;
        match writer.save(&keyword, &article)? {
            SaveOutcome::Saved(path) => println!("\nArticle saved to {}", path.display()),
            SaveOutcome::Skipped(path) => {
                println!("\nArticle already exists, skipped: {}", path.display());
            }
        }
    } else if params.quiet {
        tracing::warn!("Nothing to do: --quiet without --save");
    }

    Ok(())
}

/// Pick the article keyword out of the keywords trends are available for
fn resolve_keyword(requested: Option<&str>, available: &[String]) -> Result<String> {
    match requested {
        Some(k) if available.iter().any(|a| a == k) => Ok(k.to_string()),
        Some(k) => bail!(
            "Keyword '{k}' is not one of the fetched keywords: {}",
            available.join(", ")
        ),
        None => available
            .first()
            .cloned()
            .context("Please enter at least one keyword"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use trendscribe::generator::ArticleGenerator;
    use trendscribe::models::{Region, Timeframe, TrendQuery};
    use trendscribe::provider::{ProviderKind, SyntheticProvider, TrendsService};
    use trendscribe::utils::article_filename;

    fn params(snapshot: Option<PathBuf>, keyword: Option<&str>) -> GenerateParams {
        GenerateParams {
            keywords: "AI, machine learning, data science".to_string(),
            keyword: keyword.map(str::to_string),
            timeframe: "past-7-days".to_string(),
            region: "US".to_string(),
            tone: Some("informative".to_string()),
            length: Some("short".to_string()),
            seed: Some(1),
            snapshot,
            save: true,
            quiet: true,
        }
    }

    /// Sample-backed snapshot for "rust" saved into `dir`
    async fn saved_snapshot(dir: &TempDir) -> PathBuf {
        let service = TrendsService::new(Arc::new(SyntheticProvider::sample()), Duration::from_secs(5));
        let mut session = Session::new(service, ArticleGenerator::new());
        session
            .refresh(TrendQuery::new(
                vec!["rust".to_string()],
                Timeframe::PastThirtyDays,
                Region::Worldwide,
            ))
            .await;

        let writer = ArticleWriter::new(dir.path(), false).unwrap();
        writer.save_snapshot(session.snapshot().unwrap()).unwrap()
    }

    fn sample_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.provider.kind = ProviderKind::Sample;
        config.output.dir = dir.path().join("articles");
        config
    }

    #[test]
    fn test_resolve_keyword() {
        let available = vec!["rust".to_string(), "go".to_string()];
        assert_eq!(resolve_keyword(None, &available).unwrap(), "rust");
        assert_eq!(resolve_keyword(Some("go"), &available).unwrap(), "go");
        assert!(resolve_keyword(Some("AI"), &available).is_err());
        assert!(resolve_keyword(None, &[]).is_err());
    }

    #[tokio::test]
    async fn test_snapshot_keyword_is_the_default() {
        let dir = TempDir::new().unwrap();
        let snapshot = saved_snapshot(&dir).await;
        let config = sample_config(&dir);
        let articles = config.output.dir.clone();

        generate(config, params(Some(snapshot), None)).await.unwrap();

        let article = std::fs::read_to_string(articles.join(article_filename("rust"))).unwrap();
        assert!(article.starts_with("# Trending Insights: Understanding the Rise of rust\n"));
        assert!(!articles.join(article_filename("AI")).exists());
    }

    #[tokio::test]
    async fn test_snapshot_keyword_can_be_requested() {
        let dir = TempDir::new().unwrap();
        let snapshot = saved_snapshot(&dir).await;
        let config = sample_config(&dir);
        let articles = config.output.dir.clone();

        generate(config, params(Some(snapshot), Some("rust"))).await.unwrap();
        assert!(articles.join(article_filename("rust")).exists());
    }

    #[tokio::test]
    async fn test_snapshot_rejects_keyword_it_lacks() {
        let dir = TempDir::new().unwrap();
        let snapshot = saved_snapshot(&dir).await;

        let result = generate(sample_config(&dir), params(Some(snapshot), Some("AI"))).await;
        assert!(result.is_err());
    }
}
