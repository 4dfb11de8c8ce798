//! Baseline vs. supplemented schedule pattern comparison.

pub mod gtfs;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::schedule::gtfs::GtfsFeed;

/// A distinct stop sequence and how many trips run it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPattern {
    pub route_id: String,
    pub stop_ids: Vec<String>,
    pub count: usize,
}

/// Patterns split by GTFS `direction_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePatterns {
    pub direction_0: Vec<StopPattern>,
    pub direction_1: Vec<StopPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternChange {
    Normal,
    SkipStops,
    RunningSections,
    Rerouted,
}

/// How one supplemented pattern departs from the main regular pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternDiff {
    pub pattern_type: PatternChange,
    pub skipped_stops: Vec<String>,
    pub added_stops: Vec<String>,
    pub trips_affected: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteDiff {
    pub direction_0: Vec<PatternDiff>,
    pub direction_1: Vec<PatternDiff>,
}

impl RouteDiff {
    pub fn is_empty(&self) -> bool {
        self.direction_0.is_empty() && self.direction_1.is_empty()
    }
}

/// Classify a supplemented stop list against the regular one.
pub fn classify_change(regular: &[String], supplemented: &[String]) -> PatternChange {
    if regular == supplemented {
        PatternChange::Normal
    } else if supplemented.iter().all(|stop| regular.contains(stop)) {
        PatternChange::SkipStops
    } else if supplemented.len() * 2 < regular.len() {
        PatternChange::RunningSections
    } else {
        PatternChange::Rerouted
    }
}

/// Compare each supplemented pattern with the first (main) regular pattern per direction.
pub fn compare_route_patterns(regular: &RoutePatterns, supplemented: &RoutePatterns) -> RouteDiff {
    RouteDiff {
        direction_0: compare_direction(&regular.direction_0, &supplemented.direction_0),
        direction_1: compare_direction(&regular.direction_1, &supplemented.direction_1),
    }
}

fn compare_direction(regular: &[StopPattern], supplemented: &[StopPattern]) -> Vec<PatternDiff> {
    let Some(main) = regular.first() else {
        return Vec::new();
    };
    let reg_stops: BTreeSet<&String> = main.stop_ids.iter().collect();
    supplemented
        .iter()
        .filter_map(|pattern| {
            let pattern_type = classify_change(&main.stop_ids, &pattern.stop_ids);
            if pattern_type == PatternChange::Normal {
                return None;
            }
            let supp_stops: BTreeSet<&String> = pattern.stop_ids.iter().collect();
            Some(PatternDiff {
                pattern_type,
                skipped_stops: reg_stops.difference(&supp_stops).map(|s| s.to_string()).collect(),
                added_stops: supp_stops.difference(&reg_stops).map(|s| s.to_string()).collect(),
                trips_affected: pattern.count,
            })
        })
        .collect()
}

/// Table sizes of one schedule feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedCounts {
    pub routes: usize,
    pub trips: usize,
    pub stops: usize,
}

impl FeedCounts {
    pub fn of(feed: &GtfsFeed) -> Self {
        Self {
            routes: feed.route_ids().len(),
            trips: feed.trips.len(),
            stops: feed.stop_count(),
        }
    }
}

/// Route-level overview of a regular feed against its supplemented counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteComparison {
    pub regular: FeedCounts,
    pub supplemented: FeedCounts,
    pub regular_routes: BTreeSet<String>,
    pub supplemented_routes: BTreeSet<String>,
    pub only_in_regular: BTreeSet<String>,
    pub only_in_supplemented: BTreeSet<String>,
}

pub fn compare_routes(regular: &GtfsFeed, supplemented: &GtfsFeed) -> RouteComparison {
    let regular_routes = regular.route_ids();
    let supplemented_routes = supplemented.route_ids();
    RouteComparison {
        regular: FeedCounts::of(regular),
        supplemented: FeedCounts::of(supplemented),
        only_in_regular: regular_routes.difference(&supplemented_routes).cloned().collect(),
        only_in_supplemented: supplemented_routes.difference(&regular_routes).cloned().collect(),
        regular_routes,
        supplemented_routes,
    }
}
