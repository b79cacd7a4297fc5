//! Guidance - Terminal Front End for the Career Guidance Portal
//!
//! Runs the career quiz, a streaming chat with the guidance assistant, and
//! catalog browsing from a terminal. Everything printed for the student goes
//! to stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Take the quiz
//! guidance quiz
//!
//! # Chat, attaching a marksheet to the first message
//! guidance chat --image marksheet.png
//!
//! # Browse colleges in Karnataka
//! guidance browse colleges --filter state=karnataka
//!
//! # Custom config file and verbose logging
//! guidance --config ./guidance.toml --log-level debug chat
//! RUST_LOG=guidance_core=trace guidance chat
//! ```

mod browse;
mod chat;
mod quiz;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use guidance_core::{
    default_config_path, load_config_from_path, ConfigOverrides, GuidanceConfig, QuestionBank,
    StaticCatalog,
};

use browse::Collection;

/// Guidance - career quiz, counselling chat and catalogs in the terminal
#[derive(Parser, Debug)]
#[command(name = "guidance")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "GUIDANCE_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Catalog JSON file replacing the built-in data
    #[arg(long, value_name = "FILE", global = true)]
    catalog: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short = 'l',
        long,
        env = "GUIDANCE_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer a short questionnaire and get career recommendations
    Quiz {
        /// Number of recommendations to keep
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Question bank TOML file
        #[arg(long, value_name = "FILE")]
        questions: Option<PathBuf>,
    },

    /// Chat with the guidance assistant (Ctrl-C cancels a reply)
    Chat {
        /// Image to attach to the first message
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,

        /// Chat API base URL
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,

        /// Model name
        #[arg(short = 'm', long)]
        model: Option<String>,
    },

    /// Search one of the catalogs
    Browse {
        /// Collection to search
        #[arg(value_enum)]
        collection: Collection,

        /// Free-text search
        #[arg(short = 'q', long)]
        query: Option<String>,

        /// Field filter, repeatable
        #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize logging with the specified level
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("guidance={level},guidance_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

/// Load configuration and apply command-line overrides
fn load_settings(config_path: Option<PathBuf>, overrides: &ConfigOverrides) -> Result<GuidanceConfig> {
    if let Some(ref path) = config_path {
        anyhow::ensure!(path.exists(), "Config file not found: {}", path.display());
    }
    let path = config_path.or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        source = %config.source(),
        file = ?config.config_file_path,
        "Configuration loaded"
    );
    Ok(config)
}

fn load_catalog(config: &GuidanceConfig) -> Result<StaticCatalog> {
    match config.catalog.data_path {
        Some(ref path) => StaticCatalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => StaticCatalog::builtin().context("Built-in catalog is invalid"),
    }
}

fn load_questions(config: &GuidanceConfig) -> Result<QuestionBank> {
    match config.quiz.question_bank {
        Some(ref path) => QuestionBank::load(path)
            .with_context(|| format!("Failed to load questions from {}", path.display())),
        None => QuestionBank::builtin().context("Built-in question bank is invalid"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(version = env!("CARGO_PKG_VERSION"), "Guidance starting");

    let mut overrides = ConfigOverrides::new();
    if let Some(path) = args.catalog {
        overrides = overrides.with_catalog_path(path);
    }

    match args.command {
        Command::Quiz { top_n, questions } => {
            if let Some(n) = top_n {
                overrides = overrides.with_top_n(n);
            }
            if let Some(path) = questions {
                overrides = overrides.with_question_bank(path);
            }
            let config = load_settings(args.config, &overrides)?;
            let catalog = load_catalog(&config)?;
            let bank = load_questions(&config)?;
            quiz::run(&config, bank, &catalog, io::stdin().lock(), io::stdout().lock())
        }
        Command::Chat {
            image,
            base_url,
            model,
        } => {
            if let Some(url) = base_url {
                overrides = overrides.with_base_url(url);
            }
            if let Some(model) = model {
                overrides = overrides.with_model(model);
            }
            let config = load_settings(args.config, &overrides)?;
            chat::run(&config, image.as_deref()).await
        }
        Command::Browse {
            collection,
            query,
            filters,
            json,
        } => {
            let config = load_settings(args.config, &overrides)?;
            let catalog = load_catalog(&config)?;
            let query = browse::Query {
                collection,
                text: query.as_deref(),
                filters: &filters,
                json,
            };
            let matches = browse::run(&catalog, &query, io::stdout().lock())?;
            debug!(matches, "Browse finished");
            Ok(())
        }
    }
}
