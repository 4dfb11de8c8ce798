//! CLI entry-point for the single-line timeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{config::Settings, data::fetch, signals};

/// Args for the `timeline` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Feed JSON file for one route.
    #[arg(long)]
    pub input: PathBuf,
}

#[instrument(skip(_settings))]
pub async fn run(args: Args, _settings: Settings) -> Result<()> {
    let feeds = fetch::load_feeds(&args.input)?;
    let records = signals::timeline(feeds.entities());
    for record in &records {
        let start = record
            .start_time()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{start}\t{}\t{}\t{}",
            record.alert_type, record.header_text, record.active_period_text
        );
    }
    Ok(())
}
