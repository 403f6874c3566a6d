//! Tests for config module

use serial_test::serial;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use trendscribe::config::Config;
use trendscribe::generator::{Length, Tone};
use trendscribe::provider::ProviderKind;

const ENV_KEYS: &[&str] = &[
    "TRENDSCRIBE_PROVIDER",
    "TRENDSCRIBE_TONE",
    "TRENDSCRIBE_LENGTH",
    "TRENDSCRIBE_BASE_URL",
    "TRENDSCRIBE_RATE_LIMIT",
    "TRENDSCRIBE_SEED",
    "TRENDSCRIBE_OUTPUT_DIR",
    "TRENDSCRIBE_SKIP_EXISTING",
    "TRENDSCRIBE_LOG_FORMAT",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_config_file_exists() {
    let config_path = Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_project_config_loads() {
    let config = Config::from_file(Path::new("config.toml")).expect("config.toml should parse");
    assert!(config.validate().is_ok());
    assert_eq!(config.provider.kind, ProviderKind::Google);
    assert_eq!(config.provider.host_language, "en-US");
    assert_eq!(config.generator.default_length, Length::Medium);
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[provider]
kind = "random"
requests_per_second = 3

[generator]
default_tone = "conversational"
default_length = "short"
seed = 99

[output]
dir = "articles"
skip_existing = true
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Random);
    assert_eq!(config.provider.requests_per_second, 3);
    assert_eq!(config.generator.default_tone, Tone::Conversational);
    assert_eq!(config.generator.default_length, Length::Short);
    assert_eq!(config.generator.seed, Some(99));
    assert_eq!(config.output.dir, PathBuf::from("articles"));
    assert!(config.output.skip_existing);
}

#[test]
fn test_from_file_rejects_unknown_tone() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[generator]\ndefault_tone = \"sarcastic\"").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_from_file_missing() {
    assert!(Config::from_file(Path::new("/nonexistent/trendscribe.toml")).is_err());
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Google);
    assert_eq!(config.provider.requests_per_second, 1);
    assert_eq!(config.generator.default_tone, Tone::Informative);
    assert_eq!(config.generator.seed, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("TRENDSCRIBE_PROVIDER", "sample");
    std::env::set_var("TRENDSCRIBE_TONE", "Persuasive");
    std::env::set_var("TRENDSCRIBE_LENGTH", "long");
    std::env::set_var("TRENDSCRIBE_RATE_LIMIT", "4");
    std::env::set_var("TRENDSCRIBE_SEED", "123");
    std::env::set_var("TRENDSCRIBE_OUTPUT_DIR", "/tmp/trendscribe-out");
    std::env::set_var("TRENDSCRIBE_SKIP_EXISTING", "true");

    let config = Config::from_env().unwrap();
    clear_env();

    assert_eq!(config.provider.kind, ProviderKind::Sample);
    assert_eq!(config.generator.default_tone, Tone::Persuasive);
    assert_eq!(config.generator.default_length, Length::Long);
    assert_eq!(config.provider.requests_per_second, 4);
    assert_eq!(config.generator.seed, Some(123));
    assert_eq!(config.output.dir, PathBuf::from("/tmp/trendscribe-out"));
    assert!(config.output.skip_existing);
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_provider() {
    clear_env();
    std::env::set_var("TRENDSCRIBE_PROVIDER", "bing");

    let result = Config::from_env();
    clear_env();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_log_format_fails_validation() {
    clear_env();
    std::env::set_var("TRENDSCRIBE_LOG_FORMAT", "xml");

    let config = Config::from_env().unwrap();
    clear_env();

    assert!(config.validate().is_err());
}
