//! Command-line interface wiring for ps-analyzer.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod extract;
pub mod fetch;
pub mod precheck;
pub mod summarize;
pub mod timeline;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Planned service alert analyzer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Fetch(args) => fetch::run(args, settings).await,
            Commands::Extract(args) => extract::run(args, settings).await,
            Commands::Summarize(args) => summarize::run(args, settings).await,
            Commands::Timeline(args) => timeline::run(args, settings).await,
            Commands::Precheck(args) => precheck::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download raw alert feeds per route.
    Fetch(fetch::Args),
    /// Parse free-text alerts with one or more extractors and compare results.
    Extract(extract::Args),
    /// Group feed alerts by category, optionally exporting CSVs.
    Summarize(summarize::Args),
    /// List one feed's alerts ordered by start time.
    Timeline(timeline::Args),
    /// Compare regular and supplemented schedule patterns for a route.
    Precheck(precheck::Args),
}

/// Extraction strategy selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractMethod {
    /// Deterministic pattern matching.
    Regex,
    /// OpenAI-compatible chat completions.
    Openai,
    /// Local Ollama model.
    Ollama,
}
