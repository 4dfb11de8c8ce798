//! Static-schedule loader (directory or zip): routes, trips and stop times grouped into stop patterns.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::schedule::{RoutePatterns, StopPattern};

/// Route variants compared together when variants are requested.
const ROUTE_GROUPS: &[&[&str]] = &[
    &["5", "5X"],
    &["6", "6X"],
    &["7", "7X"],
    &["F", "FX"],
    &["FS", "GS", "H"],
    &["J", "Z"],
];

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub route_id: String,
    #[serde(default)]
    pub route_short_name: Option<String>,
    #[serde(default)]
    pub route_long_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trip {
    pub route_id: String,
    pub trip_id: String,
    #[serde(default)]
    pub direction_id: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopTime {
    pub trip_id: String,
    pub stop_id: String,
    pub stop_sequence: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stop {
    pub stop_id: String,
    #[serde(default)]
    pub stop_name: Option<String>,
}

/// Schedule tables used by the precheck. `routes` and `stops` are empty when the
/// feed does not ship them.
#[derive(Debug, Clone, Default)]
pub struct GtfsFeed {
    pub routes: Vec<Route>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTime>,
    pub stops: Vec<Stop>,
}

impl GtfsFeed {
    /// Route ids from `routes.txt`, falling back to the ids trips reference.
    pub fn route_ids(&self) -> BTreeSet<String> {
        if self.routes.is_empty() {
            self.trips.iter().map(|t| t.route_id.clone()).collect()
        } else {
            self.routes.iter().map(|r| r.route_id.clone()).collect()
        }
    }

    /// Stops listed in `stops.txt`, or the distinct stops served in `stop_times.txt`.
    pub fn stop_count(&self) -> usize {
        if self.stops.is_empty() {
            self.stop_times
                .iter()
                .map(|st| st.stop_id.as_str())
                .collect::<HashSet<_>>()
                .len()
        } else {
            self.stops.len()
        }
    }
}

/// Where the feed's `.txt` tables come from.
enum FeedFiles {
    Dir(PathBuf),
    /// Archive entries read into memory, keyed by bare file name.
    Zip(HashMap<String, String>),
}

impl FeedFiles {
    fn open(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::Dir(path.to_path_buf()));
        }
        let file = File::open(path).with_context(|| format!("open {path:?}"))?;
        let mut archive = ZipArchive::new(file).with_context(|| format!("read archive {path:?}"))?;
        let mut entries = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() || !entry.name().ends_with(".txt") {
                continue;
            }
            let name = entry
                .name()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string();
            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .with_context(|| format!("read {name} in {path:?}"))?;
            entries.insert(name, text);
        }
        Ok(Self::Zip(entries))
    }

    /// Parsed rows of `name`, or `None` when the feed has no such table.
    fn table<T: DeserializeOwned>(&self, name: &str) -> Result<Option<Vec<T>>> {
        match self {
            Self::Dir(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                let reader =
                    csv::Reader::from_path(&path).with_context(|| format!("open {path:?}"))?;
                read_rows(reader, name).map(Some)
            }
            Self::Zip(entries) => match entries.get(name) {
                Some(text) => read_rows(csv::Reader::from_reader(text.as_bytes()), name).map(Some),
                None => Ok(None),
            },
        }
    }

    fn required<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        self.table(name)?
            .ok_or_else(|| anyhow!("schedule feed is missing {name}"))
    }

    fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let rows = self.table(name)?;
        if rows.is_none() {
            debug!(table = name, "optional schedule table absent");
        }
        Ok(rows.unwrap_or_default())
    }
}

/// Read a schedule feed from an unpacked directory or a `.zip` archive.
///
/// `trips.txt` and `stop_times.txt` are required; `routes.txt` and `stops.txt`
/// are loaded when present.
pub fn load_feed(path: &Path) -> Result<GtfsFeed> {
    let files = FeedFiles::open(path)?;
    let feed = GtfsFeed {
        routes: files.optional("routes.txt")?,
        trips: files.required("trips.txt")?,
        stop_times: files.required("stop_times.txt")?,
        stops: files.optional("stops.txt")?,
    };
    info!(
        path = %path.display(),
        routes = feed.routes.len(),
        trips = feed.trips.len(),
        stop_times = feed.stop_times.len(),
        "loaded schedule feed"
    );
    Ok(feed)
}

fn read_rows<T: DeserializeOwned, R: Read>(mut reader: csv::Reader<R>, name: &str) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.with_context(|| format!("parse {name}"))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Route ids checked for `route_id`, expanded to its variant group when asked.
pub fn route_variants(route_id: &str, include_variants: bool) -> Vec<String> {
    if include_variants {
        if let Some(group) = ROUTE_GROUPS.iter().find(|group| group.contains(&route_id)) {
            return group.iter().map(|r| r.to_string()).collect();
        }
    }
    vec![route_id.to_string()]
}

/// Distinct stop sequences per direction, most frequent first.
pub fn route_patterns(feed: &GtfsFeed, route_id: &str, include_variants: bool) -> RoutePatterns {
    let routes = route_variants(route_id, include_variants);

    let mut sequences: HashMap<&str, Vec<(u32, &str)>> = HashMap::new();
    for stop_time in &feed.stop_times {
        sequences
            .entry(stop_time.trip_id.as_str())
            .or_default()
            .push((stop_time.stop_sequence, stop_time.stop_id.as_str()));
    }

    let mut grouped: [IndexMap<(String, Vec<String>), usize>; 2] = Default::default();
    for trip in feed.trips.iter().filter(|t| routes.contains(&t.route_id)) {
        let Some(direction) = trip.direction_id.filter(|d| *d <= 1) else {
            continue;
        };
        let Some(stops) = sequences.get(trip.trip_id.as_str()) else {
            continue;
        };
        let mut stops = stops.clone();
        stops.sort_by_key(|(seq, _)| *seq);
        let stop_ids: Vec<String> = stops.into_iter().map(|(_, id)| id.to_string()).collect();
        *grouped[direction as usize]
            .entry((trip.route_id.clone(), stop_ids))
            .or_insert(0) += 1;
    }

    let [dir0, dir1] = grouped;
    RoutePatterns {
        direction_0: into_patterns(dir0),
        direction_1: into_patterns(dir1),
    }
}

fn into_patterns(grouped: IndexMap<(String, Vec<String>), usize>) -> Vec<StopPattern> {
    let mut patterns: Vec<StopPattern> = grouped
        .into_iter()
        .map(|((route_id, stop_ids), count)| StopPattern {
            route_id,
            stop_ids,
            count,
        })
        .collect();
    patterns.sort_by(|a, b| b.count.cmp(&a.count));
    patterns
}
