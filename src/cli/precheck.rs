//! CLI entry-point for the schedule pattern precheck.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    schedule::{self, gtfs},
};

/// Args for the `precheck` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Regular schedule feed, unpacked directory or `.zip`.
    #[arg(long)]
    pub regular: PathBuf,
    /// Supplemented schedule feed, unpacked directory or `.zip`.
    #[arg(long)]
    pub supplemented: PathBuf,
    /// Route to compare.
    #[arg(long)]
    pub route: String,
    /// Compare only the exact route id, not its variant group.
    #[arg(long)]
    pub exact: bool,
}

#[instrument(skip(_settings))]
pub async fn run(args: Args, _settings: Settings) -> Result<()> {
    let regular = gtfs::load_feed(&args.regular)?;
    let supplemented = gtfs::load_feed(&args.supplemented)?;
    let routes = schedule::compare_routes(&regular, &supplemented);
    info!(
        only_in_regular = routes.only_in_regular.len(),
        only_in_supplemented = routes.only_in_supplemented.len(),
        "compared schedule routes"
    );
    let include_variants = !args.exact;
    let diff = schedule::compare_route_patterns(
        &gtfs::route_patterns(&regular, &args.route, include_variants),
        &gtfs::route_patterns(&supplemented, &args.route, include_variants),
    );
    info!(
        route = %args.route,
        direction_0 = diff.direction_0.len(),
        direction_1 = diff.direction_1.len(),
        "compared schedule patterns"
    );
    let report = json!({ "routes": routes, "patterns": diff });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
