//! Alert feed retrieval. Network glue only; nothing here feeds back into normalization rules.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tracing::{info, warn};

use crate::{
    config::Settings,
    data::feed::{FeedEntity, FeedMessage},
};

/// Routes queried when no explicit list is given.
pub const SUBWAY_LINES: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "A", "C", "E", "B", "D", "F", "M", "N", "Q", "R", "W", "G",
    "J", "Z", "L", "S",
];

/// Thin client over the filtered real-time alerts endpoint.
#[derive(Debug, Clone)]
pub struct AlertFeedClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    agency_id: String,
}

impl AlertFeedClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ps-analyzer/0.1")
            .timeout(settings.request_timeout())
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.alerts_base_url.clone(),
            api_key: settings.alerts_api_key.clone(),
            agency_id: settings.agency_id.clone(),
        })
    }

    /// Fetch the raw alert feed for one route.
    pub async fn fetch_route(&self, route_id: &str) -> Result<FeedMessage> {
        let mut params = vec![
            ("type", "json"),
            ("routeId", route_id),
            ("agencyId", self.agency_id.as_str()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.as_str()));
        }
        let resp = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("request alerts for route {route_id}"))?
            .error_for_status()
            .with_context(|| format!("alerts endpoint rejected route {route_id}"))?;
        let message: FeedMessage = resp
            .json()
            .await
            .with_context(|| format!("decode alert feed for route {route_id}"))?;
        info!(route = route_id, entities = message.entity.len(), "fetched alert feed");
        Ok(message)
    }
}

/// Cache a raw feed under `data/raw/alerts/<route>.json`.
pub fn persist_feed(route_id: &str, message: &FeedMessage, settings: &Settings) -> Result<PathBuf> {
    let path = settings
        .join_data("raw/alerts")
        .join(format!("{route_id}.json"));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(&path).with_context(|| format!("create {path:?}"))?;
    let body = serde_json::to_vec_pretty(message)?;
    file.write_all(&body)?;
    info!(path = %path.display(), count = message.entity.len(), "saved alert feed");
    Ok(path)
}

/// Feeds read from disk plus the number of files that could not be used.
#[derive(Debug, Clone, Default)]
pub struct LoadedFeeds {
    pub feeds: Vec<FeedMessage>,
    pub skipped: usize,
}

impl LoadedFeeds {
    pub fn entities(&self) -> impl Iterator<Item = &FeedEntity> {
        self.feeds.iter().flat_map(|feed| feed.entity.iter())
    }
}

/// Load one cached feed file, or every `.json` feed under a directory.
///
/// A single file must parse. Inside a directory, unreadable entries and files
/// that are not valid feeds are logged and counted in `skipped`.
pub fn load_feeds(path: &Path) -> Result<LoadedFeeds> {
    let mut loaded = LoadedFeeds::default();
    if path.is_file() {
        loaded.feeds.push(read_feed(path)?);
        return Ok(loaded);
    }
    if !path.is_dir() {
        bail!("no feed file or directory at {path:?}");
    }
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(path) {
        match entry {
            Ok(entry) => {
                let file = entry.into_path();
                if file.extension().and_then(|s| s.to_str()) == Some("json") {
                    files.push(file);
                }
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable entry");
                loaded.skipped += 1;
            }
        }
    }
    files.sort();
    for file in files {
        match read_feed(&file) {
            Ok(feed) => loaded.feeds.push(feed),
            Err(err) => {
                warn!(file = %file.display(), error = %format!("{err:#}"), "skipping feed file");
                loaded.skipped += 1;
            }
        }
    }
    info!(
        path = %path.display(),
        feeds = loaded.feeds.len(),
        skipped = loaded.skipped,
        "loaded alert feeds"
    );
    Ok(loaded)
}

fn read_feed(path: &Path) -> Result<FeedMessage> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse feed {path:?}"))
}
