//! File output for generated articles and fetched trend data
//!
//! Articles are saved as plain text under the name they are offered for
//! download with (`{keyword}_article.txt`). Snapshots are saved as pretty JSON
//! and interest tables as CSV.

pub mod export;

pub use export::{interest_to_csv, load_snapshot, INTEREST_CSV_NAME, SNAPSHOT_JSON_NAME};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{InterestOverTime, TrendsSnapshot};
use crate::utils::article_filename;

/// What happened to one save request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// File already existed and skip-existing is on
    Skipped(PathBuf),
}

impl SaveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Saved(path) | Self::Skipped(path) => path,
        }
    }
}

/// Writes articles and trend data into one output directory
#[derive(Debug, Clone)]
pub struct ArticleWriter {
    output_dir: PathBuf,
    skip_existing: bool,
}

impl ArticleWriter {
    /// Create a writer, creating `output_dir` if needed
    pub fn new(output_dir: &Path, skip_existing: bool) -> Result<Self> {
        fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            skip_existing,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path of the article about `keyword`
    pub fn path_for(&self, keyword: &str) -> PathBuf {
        self.output_dir.join(article_filename(keyword))
    }

    /// Save `article` as the text file for `keyword`
    pub fn save(&self, keyword: &str, article: &str) -> Result<SaveOutcome> {
        let path = self.path_for(keyword);

        if self.skip_existing && path.exists() {
            tracing::debug!(keyword = %keyword, path = %path.display(), "Skipping existing article");
            return Ok(SaveOutcome::Skipped(path));
        }

        fs::write(&path, article)
            .with_context(|| format!("Failed to write article: {}", path.display()))?;

        tracing::debug!(keyword = %keyword, path = %path.display(), "Saved article");
        Ok(SaveOutcome::Saved(path))
    }

    /// Save a snapshot as pretty JSON
    pub fn save_snapshot(&self, snapshot: &TrendsSnapshot) -> Result<PathBuf> {
        let path = self.output_dir.join(SNAPSHOT_JSON_NAME);
        let json = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Saved trends snapshot");
        Ok(path)
    }

    /// Save the interest table as CSV
    pub fn save_interest_csv(&self, interest: &InterestOverTime) -> Result<PathBuf> {
        let path = self.output_dir.join(INTEREST_CSV_NAME);

        fs::write(&path, interest_to_csv(interest))
            .with_context(|| format!("Failed to write CSV: {}", path.display()))?;

        tracing::info!(path = %path.display(), rows = interest.len(), "Saved interest table");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_uses_download_name() {
        let dir = TempDir::new().unwrap();
        let writer = ArticleWriter::new(dir.path(), false).unwrap();

        let outcome = writer.save("machine learning", "# Title").unwrap();
        assert_eq!(
            outcome,
            SaveOutcome::Saved(dir.path().join("machine_learning_article.txt"))
        );
        assert_eq!(fs::read_to_string(outcome.path()).unwrap(), "# Title");
    }

    #[test]
    fn test_overwrite_without_skip() {
        let dir = TempDir::new().unwrap();
        let writer = ArticleWriter::new(dir.path(), false).unwrap();

        writer.save("AI", "first").unwrap();
        writer.save("AI", "second").unwrap();
        assert_eq!(fs::read_to_string(writer.path_for("AI")).unwrap(), "second");
    }

    #[test]
    fn test_skip_existing() {
        let dir = TempDir::new().unwrap();
        let writer = ArticleWriter::new(dir.path(), true).unwrap();

        writer.save("AI", "first").unwrap();
        let outcome = writer.save("AI", "second").unwrap();

        assert!(matches!(outcome, SaveOutcome::Skipped(_)));
        assert_eq!(fs::read_to_string(writer.path_for("AI")).unwrap(), "first");
    }

    #[test]
    fn test_creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = ArticleWriter::new(&nested, false).unwrap();
        assert!(writer.output_dir().is_dir());
    }
}
