//! Configuration management for trendscribe
//!
//! Configuration is loaded from a TOML file or from `TRENDSCRIBE_*`
//! environment variables. Every section is optional and falls back to its
//! defaults, so a file only needs the keys it changes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::generator::{Length, Tone};
use crate::provider::ProviderKind;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Trend data backend configuration
    pub provider: ProviderConfig,

    /// Article generator configuration
    pub generator: GeneratorConfig,

    /// Output files
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trend data backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Which backend serves trend data
    pub kind: ProviderKind,

    /// Service root for the google backend
    pub base_url: String,

    /// `hl` parameter sent with every request
    pub host_language: String,

    /// Timezone offset in minutes (`tz` parameter)
    pub tz_offset: i32,

    /// Overall per-call timeout in seconds
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Retries after the first attempt for 429/5xx responses
    pub max_retries: u32,

    /// Base backoff delay in milliseconds
    pub backoff_ms: u64,

    /// Rate limit (requests per second)
    pub requests_per_second: u32,
}

/// Article generator configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub default_tone: Tone,

    pub default_length: Length,

    /// Fixed seed for reproducible articles
    pub seed: Option<u64>,

    /// Custom template catalog (TOML)
    pub templates_path: Option<PathBuf>,
}

/// Where articles and snapshots are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,

    /// Leave existing article files untouched
    pub skip_existing: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Google,
            base_url: String::from("https://trends.google.com"),
            host_language: String::from("en-US"),
            tz_offset: 360,
            request_timeout_secs: 25,
            connect_timeout_secs: 10,
            max_retries: 2,
            backoff_ms: 100,
            requests_per_second: 1,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            skip_existing: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let kind = match std::env::var("TRENDSCRIBE_PROVIDER") {
            Ok(v) => ProviderKind::parse(&v)
                .with_context(|| format!("Unknown TRENDSCRIBE_PROVIDER value: {v}"))?,
            Err(_) => defaults.provider.kind,
        };

        let default_tone = match std::env::var("TRENDSCRIBE_TONE") {
            Ok(v) => Tone::parse(&v).with_context(|| format!("Unknown TRENDSCRIBE_TONE value: {v}"))?,
            Err(_) => defaults.generator.default_tone,
        };

        let default_length = match std::env::var("TRENDSCRIBE_LENGTH") {
            Ok(v) => {
                Length::parse(&v).with_context(|| format!("Unknown TRENDSCRIBE_LENGTH value: {v}"))?
            }
            Err(_) => defaults.generator.default_length,
        };

        Ok(Self {
            provider: ProviderConfig {
                kind,
                base_url: std::env::var("TRENDSCRIBE_BASE_URL")
                    .unwrap_or(defaults.provider.base_url),
                host_language: std::env::var("TRENDSCRIBE_HOST_LANGUAGE")
                    .unwrap_or(defaults.provider.host_language),
                tz_offset: env_parse("TRENDSCRIBE_TZ_OFFSET").unwrap_or(defaults.provider.tz_offset),
                request_timeout_secs: env_parse("TRENDSCRIBE_REQUEST_TIMEOUT")
                    .unwrap_or(defaults.provider.request_timeout_secs),
                connect_timeout_secs: env_parse("TRENDSCRIBE_CONNECT_TIMEOUT")
                    .unwrap_or(defaults.provider.connect_timeout_secs),
                max_retries: env_parse("TRENDSCRIBE_MAX_RETRIES")
                    .unwrap_or(defaults.provider.max_retries),
                backoff_ms: env_parse("TRENDSCRIBE_BACKOFF_MS").unwrap_or(defaults.provider.backoff_ms),
                requests_per_second: env_parse("TRENDSCRIBE_RATE_LIMIT")
                    .unwrap_or(defaults.provider.requests_per_second),
            },
            generator: GeneratorConfig {
                default_tone,
                default_length,
                seed: env_parse("TRENDSCRIBE_SEED"),
                templates_path: std::env::var("TRENDSCRIBE_TEMPLATES").ok().map(PathBuf::from),
            },
            output: OutputConfig {
                dir: std::env::var("TRENDSCRIBE_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.output.dir),
                skip_existing: env_parse("TRENDSCRIBE_SKIP_EXISTING")
                    .unwrap_or(defaults.output.skip_existing),
            },
            logging: LoggingConfig {
                level: std::env::var("TRENDSCRIBE_LOG_LEVEL").unwrap_or(defaults.logging.level),
                format: std::env::var("TRENDSCRIBE_LOG_FORMAT").unwrap_or(defaults.logging.format),
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.provider.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.provider.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.provider.kind == ProviderKind::Google {
            url::Url::parse(&self.provider.base_url)
                .with_context(|| format!("Invalid provider base_url: {}", self.provider.base_url))?;
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.provider.request_timeout()
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut config = Config::default();
        config.provider.requests_per_second = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_base_url_only_matters_for_google() {
        let mut config = Config::default();
        config.provider.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.provider.kind = ProviderKind::Sample;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(25));
        assert_eq!(config.provider.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [provider]
            kind = "sample"

            [generator]
            default_tone = "analytical"
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::Sample);
        assert_eq!(config.provider.tz_offset, 360);
        assert_eq!(config.generator.default_tone, Tone::Analytical);
        assert_eq!(config.generator.default_length, Length::Medium);
        assert_eq!(config.generator.seed, Some(7));
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }
}
