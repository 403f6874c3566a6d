//! trendscribe - Search trend fetcher and template-driven article generator
//!
//! Fetches interest-over-time and related topics/queries for a handful of
//! keywords, then writes short articles about a keyword from a catalog of
//! tone-specific templates filled with the related terms.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Timeframes, regions, relation tables and snapshots
//! - [`provider`] - Trend data backends and the failure-tolerant service
//! - [`generator`] - Tones, lengths, templates and article assembly
//! - [`session`] - Snapshot and article memo between user actions
//! - [`analytics`] - Per-keyword interest summaries
//! - [`storage`] - Article, snapshot and CSV output
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use trendscribe::generator::{ArticleGenerator, Length, Tone};
//! use trendscribe::models::{Region, Timeframe, TrendQuery};
//! use trendscribe::provider::{SyntheticProvider, TrendsService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = TrendsService::new(Arc::new(SyntheticProvider::sample()), Duration::from_secs(25));
//!     let query = TrendQuery::new(vec!["AI".into()], Timeframe::PastSevenDays, Region::UnitedStates);
//!     let report = service.fetch_all(&query).await;
//!
//!     let article = ArticleGenerator::new().generate(
//!         "AI",
//!         report.snapshot.topics_for("AI"),
//!         report.snapshot.queries_for("AI"),
//!         Tone::Informative,
//!         Length::Medium,
//!     );
//!     println!("{article}");
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod provider;
pub mod session;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result, TrendscribeErrorTrait};
    pub use crate::generator::{ArticleGenerator, Length, TemplateCatalog, Tone};
    pub use crate::models::{Region, RelationTable, Timeframe, TrendQuery, TrendsSnapshot};
    pub use crate::provider::{TrendDataProvider, TrendsService};
    pub use crate::session::Session;
    pub use crate::storage::ArticleWriter;
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use generator::{ArticleGenerator, Length, Tone};
pub use models::{Region, Timeframe, TrendQuery, TrendsSnapshot};
