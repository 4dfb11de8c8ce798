//! CLI entry-point for fetching raw alert feeds.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::fetch::{self, AlertFeedClient, SUBWAY_LINES},
};

/// Args for the `fetch` sub-command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Comma separated route ids; defaults to every subway line.
    #[arg(long, value_delimiter = ',')]
    pub routes: Vec<String>,
    /// Concurrent requests.
    #[arg(long, default_value_t = 2)]
    pub concurrency: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let routes: Vec<String> = if args.routes.is_empty() {
        SUBWAY_LINES.iter().map(|r| r.to_string()).collect()
    } else {
        args.routes.clone()
    };
    let client = AlertFeedClient::from_settings(&settings)?;

    info!(routes = routes.len(), "fetching alert feeds");
    stream::iter(routes)
        .map(|route| {
            let client = client.clone();
            let settings = settings.clone();
            async move {
                let message = client
                    .fetch_route(&route)
                    .await
                    .with_context(|| format!("fetch alerts for {route}"))?;
                fetch::persist_feed(&route, &message, &settings)
                    .with_context(|| format!("save alerts for {route}"))?;
                Ok::<_, anyhow::Error>(())
            }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(())
}
