//! Command-line interface for sambung_kata.

use clap::{Parser, Subcommand, ValueEnum};
use sambung_rules::{Mode, Theme};
use std::path::PathBuf;

/// Sambung Kata - Indonesian word-chain game against an LLM
#[derive(Parser, Debug)]
#[command(name = "sambung_kata")]
#[command(about = "Word-chain game in the terminal, judged by an LLM", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal UI
    Play {
        /// Mode preselected in the menu
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Theme preselected in the menu (any, animals, fruits-vegetables, places, objects, jobs)
        #[arg(long)]
        theme: Option<Theme>,

        /// Path to a TOML game config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Ask the oracle whether a single word is valid
    Check {
        /// Word to judge
        word: String,

        /// Theme to judge against
        #[arg(long, default_value = "any")]
        theme: Theme,

        /// Path to a TOML game config
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Playable modes on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One human against the LLM
    VersusMachine,
    /// Two humans taking turns at one keyboard
    Local,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::VersusMachine => Mode::VersusMachine,
            ModeArg::Local => Mode::LocalTwoPlayer,
        }
    }
}
