//! Sambung Kata - Unified CLI
//!
//! Play in the terminal or check a single word against the oracle.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use sambung_kata::{GameConfig, LlmOracle, MoveOracle, OfflineOracle, run_tui, tui};
use sambung_rules::{ChainValidator, Theme, UsedWords};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,sambung_kata=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            mode,
            theme,
            config,
        } => play(mode.map(Into::into), theme, config).await,
        Command::Check {
            word,
            theme,
            config,
        } => check(word, theme, config).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Builds the LLM oracle, falling back to offline play without a key.
fn build_oracle(config: &GameConfig) -> Arc<dyn MoveOracle> {
    match LlmOracle::from_config(config) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            warn!(error = %e, "LLM unavailable, playing offline");
            Arc::new(OfflineOracle)
        }
    }
}

/// Run the terminal UI
async fn play(
    mode: Option<sambung_rules::Mode>,
    theme: Option<Theme>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    // Log to a file so output does not fight the TUI for the terminal.
    let log_file = std::fs::File::create(tui::LOG_FILE)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();

    let mut config = GameConfig::load(config_path.as_deref())?;
    if let Some(theme) = theme {
        config = config.with_theme(theme);
    }

    let oracle = build_oracle(&config);
    run_tui(config, oracle, mode).await
}

/// Validate one word and print the verdict
#[instrument(skip(config_path))]
async fn check(word: String, theme: Theme, config_path: Option<PathBuf>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = GameConfig::load(config_path.as_deref())?;
    let word = match ChainValidator::check(&word, None, &UsedWords::new()) {
        Ok(word) => word,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let oracle = LlmOracle::from_config(&config)?;
    info!(oracle = %oracle.name(), %word, %theme, "Checking word");

    let timeout = config.oracle_timeout();
    let verdict = tokio::time::timeout(timeout, oracle.validate(&word, theme))
        .await
        .map_err(|_| anyhow::anyhow!("oracle timed out after {:?}", timeout))??;

    println!("kata      : {}", word);
    println!("tema      : {}", theme);
    println!("valid     : {}", verdict.is_valid);
    println!("sesuai    : {}", verdict.fits_theme);
    println!("penjelasan: {}", verdict.explanation);
    Ok(())
}
