//! Template based article generator
//!
//! Produces a readable article about a keyword by filling randomly chosen
//! templates with randomly chosen phrases and whatever related topics and
//! queries the trends backend returned. Output is plain text with markdown
//! style headings and emphasis.
//!
//! Randomness is drawn in a fixed order (slot bindings, intro, paragraph
//! count, body paragraphs, conclusion), so a seeded generator is fully
//! reproducible.

pub mod slots;
pub mod templates;
pub mod tone;

pub use slots::{Slot, SlotBindings};
pub use templates::{Section, TemplateCatalog, TemplateSet};
pub use tone::{Length, Tone};

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::models::{RelationKind, RelationTable};

/// Errors raised while building a template catalog.
///
/// Generation itself never fails.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Tone '{tone}' has no {section} templates")]
    EmptySection { tone: Tone, section: Section },

    #[error("Tone '{tone}' {section} template uses unknown placeholder {{{placeholder}}}")]
    UnknownPlaceholder {
        tone: Tone,
        section: Section,
        placeholder: String,
    },

    #[error("Invalid template catalog: {0}")]
    InvalidCatalog(#[from] toml::de::Error),

    #[error("Failed to read template catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type GeneratorResult<T> = Result<T, GeneratorError>;

const PUBLISH_DATE_FORMAT: &str = "%B %d, %Y";

/// A generated article, kept in parts until rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub keyword: String,
    pub published_on: NaiveDate,
    pub intro: String,
    pub body: Vec<String>,
    pub conclusion: String,
}

impl Article {
    pub fn title(&self) -> String {
        format!("Trending Insights: Understanding the Rise of {}", self.keyword)
    }

    pub fn attribution(&self) -> String {
        format!(
            "*This article was generated based on Google Trends data for '{}'.*",
            self.keyword
        )
    }

    /// Final text: blocks separated by exactly one blank line
    pub fn render(&self) -> String {
        let mut blocks = Vec::with_capacity(self.body.len() + 5);
        blocks.push(format!("# {}", self.title()));
        blocks.push(format!(
            "*Published on {}*",
            self.published_on.format(PUBLISH_DATE_FORMAT)
        ));
        blocks.push(self.intro.clone());
        blocks.extend(self.body.iter().cloned());
        blocks.push(self.conclusion.clone());
        blocks.push(self.attribution());
        blocks.join("\n\n")
    }
}

impl std::fmt::Display for Article {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Article generator over a shared, read-only template catalog.
///
/// Cheap to clone and safe to share between threads; every call brings its
/// own random source.
#[derive(Debug, Clone)]
pub struct ArticleGenerator {
    catalog: Arc<TemplateCatalog>,
    publish_date: Option<NaiveDate>,
}

impl Default for ArticleGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleGenerator {
    /// Generator over the built-in catalog
    pub fn new() -> Self {
        Self::with_catalog(TemplateCatalog::builtin())
    }

    pub fn with_catalog(catalog: Arc<TemplateCatalog>) -> Self {
        Self {
            catalog,
            publish_date: None,
        }
    }

    /// Pin the publish date instead of reading the local clock
    pub fn with_publish_date(mut self, date: NaiveDate) -> Self {
        self.publish_date = Some(date);
        self
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Generate an article using the thread-local RNG
    pub fn generate(
        &self,
        keyword: &str,
        related_topics: Option<&RelationTable>,
        related_queries: Option<&RelationTable>,
        tone: Tone,
        length: Length,
    ) -> String {
        self.generate_with_rng(
            keyword,
            related_topics,
            related_queries,
            tone,
            length,
            &mut rand::thread_rng(),
        )
    }

    /// Generate a reproducible article from `seed`
    pub fn generate_seeded(
        &self,
        keyword: &str,
        related_topics: Option<&RelationTable>,
        related_queries: Option<&RelationTable>,
        tone: Tone,
        length: Length,
        seed: u64,
    ) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_with_rng(keyword, related_topics, related_queries, tone, length, &mut rng)
    }

    /// Generate from unvalidated tone and length strings.
    ///
    /// Unknown tones fall back to informative and unknown lengths to long.
    pub fn generate_lossy(
        &self,
        keyword: &str,
        related_topics: Option<&RelationTable>,
        related_queries: Option<&RelationTable>,
        tone: &str,
        length: &str,
    ) -> String {
        self.generate(
            keyword,
            related_topics,
            related_queries,
            Tone::parse_lossy(tone),
            Length::parse_lossy(length),
        )
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        related_topics: Option<&RelationTable>,
        related_queries: Option<&RelationTable>,
        tone: Tone,
        length: Length,
        rng: &mut R,
    ) -> String {
        self.compose_with_rng(keyword, related_topics, related_queries, tone, length, rng)
            .render()
    }

    /// Build the article parts without rendering them
    pub fn compose_with_rng<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        related_topics: Option<&RelationTable>,
        related_queries: Option<&RelationTable>,
        tone: Tone,
        length: Length,
        rng: &mut R,
    ) -> Article {
        let topics = candidates(related_topics, RelationKind::Topics);
        let queries = candidates(related_queries, RelationKind::Queries);
        let bindings = SlotBindings::resolve(keyword, &topics, &queries, rng);

        let templates = self.catalog.get(tone);
        let intro = pick(&templates.intro, &bindings, rng);

        let paragraphs = rng
            .gen_range(length.paragraph_range())
            .min(templates.body.len());
        let body = (0..paragraphs)
            .map(|_| pick(&templates.body, &bindings, rng))
            .collect();

        let conclusion = pick(&templates.conclusion, &bindings, rng);

        debug!(
            keyword = %keyword,
            tone = %tone,
            length = %length,
            paragraphs = paragraphs,
            topics = topics.len(),
            queries = queries.len(),
            "Generated article"
        );

        Article {
            keyword: keyword.to_string(),
            published_on: self
                .publish_date
                .unwrap_or_else(|| Local::now().date_naive()),
            intro,
            body,
            conclusion,
        }
    }
}

fn candidates(table: Option<&RelationTable>, kind: RelationKind) -> Vec<String> {
    table
        .map(|t| t.candidates(kind.identifying_column()))
        .unwrap_or_default()
}

/// Choose one template uniformly and fill it in.
/// Catalogs are validated non-empty, so the empty arm is unreachable in practice.
fn pick<R: Rng + ?Sized>(pool: &[String], bindings: &SlotBindings, rng: &mut R) -> String {
    pool.choose(rng)
        .map(|template| bindings.substitute(template))
        .unwrap_or_default()
}
