//! CLI entry-point for free-text alert extraction.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{cli::ExtractMethod, config::Settings, nlp};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Alert text to parse.
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,
    /// File holding the alert text.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Extractors to run and compare.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "regex")]
    pub methods: Vec<ExtractMethod>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?
        }
        (None, None) => bail!("either --text or --file is required"),
    };

    let extractors = nlp::build_extractors(&settings, &args.methods)?;
    let runs = nlp::compare(&text, &extractors).await;
    let failed = runs.iter().filter(|run| !run.succeeded()).count();
    info!(runs = runs.len(), failed, "extraction finished");
    println!("{}", serde_json::to_string_pretty(&runs)?);
    Ok(())
}
