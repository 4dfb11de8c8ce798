//! CLI entry-point for categorized alert summaries.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{config::Settings, data::fetch, signals};

/// Args for the `summarize` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Feed JSON file or directory of feeds; defaults to the cached raw feeds.
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Write one CSV per category under the outputs directory.
    #[arg(long)]
    pub export: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| settings.join_data("raw/alerts"));
    let feeds = fetch::load_feeds(&input)?;
    let summary = signals::summarize(feeds.entities());

    for (category, rows) in &summary.groups {
        println!("== {category} ({})", rows.len());
        for row in rows {
            println!("  [{}] {} | {}", row.line, row.date, row.record.header_text);
        }
    }
    println!(
        "{} alerts, {} reduced service filtered, {} malformed skipped, {} feed files skipped",
        summary.total(),
        summary.filtered,
        summary.malformed,
        feeds.skipped
    );

    if args.export {
        let paths = signals::export::write_summary_csv(&summary, &settings.join_output("summary"))?;
        info!(files = paths.len(), "exported summary");
    }
    Ok(())
}
