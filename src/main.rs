mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::{FetchParams, GenerateParams};
use trendscribe::config::Config;
use trendscribe::error::TrendscribeErrorTrait;

#[derive(Parser)]
#[command(
    name = "trendscribe",
    version,
    about = "Fetch search trends and turn them into template-driven articles",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the config file
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch interest over time and related topics/queries
    Fetch {
        /// Comma separated keywords (at most 5)
        #[arg(short, long, default_value = "AI, machine learning, data science")]
        keywords: String,

        /// Time window (see `trendscribe tones`)
        #[arg(short, long, default_value = "past-7-days")]
        timeframe: String,

        /// Region code or name
        #[arg(short, long, default_value = "US")]
        region: String,

        /// Also show interest by area at this resolution (country, region, city, dma)
        #[arg(long)]
        by_region: Option<String>,

        /// Save the fetched data as JSON in the output directory
        #[arg(long, default_value = "false")]
        save_snapshot: bool,

        /// Save the interest table as CSV in the output directory
        #[arg(long, default_value = "false")]
        csv: bool,
    },

    /// Fetch trends and generate an article about one keyword
    Generate {
        /// Comma separated keywords (at most 5); ignored with --snapshot
        #[arg(short, long, default_value = "AI, machine learning, data science")]
        keywords: String,

        /// Keyword to write about (defaults to the first fetched keyword)
        #[arg(long)]
        keyword: Option<String>,

        /// Time window (see `trendscribe tones`)
        #[arg(short, long, default_value = "past-7-days")]
        timeframe: String,

        /// Region code or name
        #[arg(short, long, default_value = "US")]
        region: String,

        /// Article tone
        #[arg(long)]
        tone: Option<String>,

        /// Article length (short, medium, long)
        #[arg(short, long)]
        length: Option<String>,

        /// Seed for reproducible articles
        #[arg(long)]
        seed: Option<u64>,

        /// Use a saved snapshot instead of fetching; its keywords apply
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Save the article to the output directory
        #[arg(short, long, default_value = "false")]
        save: bool,

        /// Do not print the article
        #[arg(short, long, default_value = "false")]
        quiet: bool,
    },

    /// List tones, lengths, timeframes and regions
    Tones,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!(provider = %config.provider.kind, "trendscribe starting");

    let outcome = match cli.command {
        Commands::Fetch {
            keywords,
            timeframe,
            region,
            by_region,
            save_snapshot,
            csv,
        } => {
            tracing::info!(
                keywords = %keywords,
                timeframe = %timeframe,
                region = %region,
                "Starting fetch command"
            );
            let params = FetchParams {
                keywords,
                timeframe,
                region,
                by_region,
                save_snapshot,
                csv,
            };
            commands::fetch(config, params).await
        }

        Commands::Generate {
            keywords,
            keyword,
            timeframe,
            region,
            tone,
            length,
            seed,
            snapshot,
            save,
            quiet,
        } => {
            tracing::info!(
                keywords = %keywords,
                keyword = ?keyword,
                tone = ?tone,
                length = ?length,
                seed = ?seed,
                "Starting generate command"
            );
            let params = GenerateParams {
                keywords,
                keyword,
                timeframe,
                region,
                tone,
                length,
                seed,
                snapshot,
                save,
                quiet,
            };
            commands::generate(config, params).await
        }

        Commands::Tones => {
            commands::tones();
            Ok(())
        }
    };

    if let Err(e) = &outcome {
        if let Some(err) = e.downcast_ref::<trendscribe::Error>() {
            tracing::error!(
                category = %err.category(),
                recoverable = err.is_recoverable(),
                error = %err,
                "Command failed"
            );
        }
        return outcome;
    }

    tracing::info!("trendscribe completed successfully");
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env().context("Failed to read configuration from environment")?,
    };
    config.validate()?;
    Ok(config)
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendscribe=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("trendscribe={level},warn")))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
