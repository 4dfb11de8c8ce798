use std::{collections::BTreeSet, fs, io::Write, path::Path};

use ps_analyzer::schedule::{
    classify_change, compare_route_patterns, compare_routes,
    gtfs::{load_feed, route_patterns, route_variants},
    FeedCounts, PatternChange, RoutePatterns, StopPattern,
};
use zip::{write::FileOptions, ZipWriter};

fn stops(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn pattern(ids: &[&str], count: usize) -> StopPattern {
    StopPattern {
        route_id: "F".into(),
        stop_ids: stops(ids),
        count,
    }
}

#[test]
fn classifies_pattern_changes() {
    let regular = stops(&["1", "2", "3", "4", "5", "6"]);
    assert_eq!(classify_change(&regular, &regular), PatternChange::Normal);
    assert_eq!(classify_change(&regular, &stops(&["1", "3", "6"])), PatternChange::SkipStops);
    assert_eq!(classify_change(&regular, &stops(&["1", "X"])), PatternChange::RunningSections);
    assert_eq!(
        classify_change(&regular, &stops(&["1", "2", "X", "4", "5", "6"])),
        PatternChange::Rerouted
    );
}

#[test]
fn compare_reports_only_changed_patterns() {
    let regular = RoutePatterns {
        direction_0: vec![pattern(&["A", "B", "C", "D"], 40)],
        direction_1: vec![],
    };
    let supplemented = RoutePatterns {
        direction_0: vec![
            pattern(&["A", "B", "C", "D"], 30),
            pattern(&["A", "E", "C", "D"], 5),
        ],
        direction_1: vec![pattern(&["D", "C"], 12)],
    };
    let diff = compare_route_patterns(&regular, &supplemented);
    assert_eq!(diff.direction_0.len(), 1);
    let change = &diff.direction_0[0];
    assert_eq!(change.pattern_type, PatternChange::Rerouted);
    assert_eq!(change.skipped_stops, stops(&["B"]));
    assert_eq!(change.added_stops, stops(&["E"]));
    assert_eq!(change.trips_affected, 5);
    assert!(diff.direction_1.is_empty());
}

#[test]
fn variant_groups_expand() {
    assert_eq!(route_variants("Z", true), stops(&["J", "Z"]));
    assert_eq!(route_variants("Z", false), stops(&["Z"]));
    assert_eq!(route_variants("L", true), stops(&["L"]));
}

#[test]
fn loads_feed_and_groups_patterns() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("trips.txt"),
        "route_id,service_id,trip_id,direction_id\n\
         F,WKD,t1,0\n\
         F,WKD,t2,0\n\
         FX,WKD,t3,0\n\
         F,WKD,t4,1\n\
         A,WKD,t5,0\n",
    )
    .expect("write trips");
    fs::write(
        dir.path().join("stop_times.txt"),
        "trip_id,arrival_time,stop_id,stop_sequence\n\
         t1,08:00:00,F01,1\n\
         t1,08:05:00,F02,2\n\
         t2,09:05:00,F02,2\n\
         t2,09:00:00,F01,1\n\
         t3,10:00:00,F01,1\n\
         t4,11:00:00,F02,1\n\
         t4,11:05:00,F01,2\n\
         t5,12:00:00,A01,1\n",
    )
    .expect("write stop_times");

    let feed = load_feed(dir.path()).expect("feed loads");
    let patterns = route_patterns(&feed, "F", true);
    assert_eq!(patterns.direction_0.len(), 2);
    assert_eq!(patterns.direction_0[0].stop_ids, stops(&["F01", "F02"]));
    assert_eq!(patterns.direction_0[0].count, 2);
    assert_eq!(patterns.direction_0[1].route_id, "FX");
    assert_eq!(patterns.direction_1[0].stop_ids, stops(&["F02", "F01"]));

    let exact = route_patterns(&feed, "F", false);
    assert_eq!(exact.direction_0.len(), 1);
}

fn write_zip(path: &Path, tables: &[(&str, &str)]) {
    let file = fs::File::create(path).expect("create zip");
    let mut writer = ZipWriter::new(file);
    for (name, body) in tables {
        writer.start_file(*name, FileOptions::default()).expect("start entry");
        writer.write_all(body.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish zip");
}

const REGULAR_TRIPS: &str = "route_id,service_id,trip_id,direction_id\n\
                             F,WKD,r1,0\n\
                             F,WKD,r2,0\n\
                             GS,WKD,r3,0\n";
const REGULAR_STOP_TIMES: &str = "trip_id,arrival_time,stop_id,stop_sequence\n\
                                  r1,08:00:00,F01,1\n\
                                  r1,08:05:00,F02,2\n\
                                  r1,08:10:00,F03,3\n\
                                  r2,09:00:00,F01,1\n\
                                  r2,09:05:00,F02,2\n\
                                  r2,09:10:00,F03,3\n\
                                  r3,10:00:00,G01,1\n";

#[test]
fn loads_zipped_feed_with_routes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive = dir.path().join("regular.zip");
    write_zip(
        &archive,
        &[
            (
                "routes.txt",
                "route_id,agency_id,route_short_name,route_long_name\n\
                 F,MTA NYCT,F,Queens Blvd Express/6 Av Local\n\
                 GS,MTA NYCT,S,42 St Shuttle\n",
            ),
            ("trips.txt", REGULAR_TRIPS),
            ("stop_times.txt", REGULAR_STOP_TIMES),
            ("notes.md", "not a table"),
        ],
    );

    let feed = load_feed(&archive).expect("zip loads");
    assert_eq!(feed.routes.len(), 2);
    assert_eq!(feed.routes[1].route_short_name.as_deref(), Some("S"));
    assert_eq!(feed.trips.len(), 3);
    assert!(feed.stops.is_empty());
    assert_eq!(
        FeedCounts::of(&feed),
        FeedCounts {
            routes: 2,
            trips: 3,
            stops: 4
        }
    );
    let patterns = route_patterns(&feed, "F", false);
    assert_eq!(patterns.direction_0[0].count, 2);
}

#[test]
fn zip_entries_inside_a_folder_are_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive = dir.path().join("nested.zip");
    write_zip(
        &archive,
        &[
            ("google_transit/trips.txt", REGULAR_TRIPS),
            ("google_transit/stop_times.txt", REGULAR_STOP_TIMES),
            ("google_transit/stops.txt", "stop_id,stop_name\nF01,Jamaica-179 St\n"),
        ],
    );
    let feed = load_feed(&archive).expect("nested zip loads");
    assert_eq!(feed.trips.len(), 3);
    assert_eq!(FeedCounts::of(&feed).stops, 1);
}

#[test]
fn missing_trips_table_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive = dir.path().join("partial.zip");
    write_zip(&archive, &[("stop_times.txt", REGULAR_STOP_TIMES)]);
    let err = load_feed(&archive).expect_err("trips.txt is required");
    assert!(err.to_string().contains("trips.txt"));
}

#[test]
fn route_comparison_reports_counts_and_set_differences() {
    let dir = tempfile::tempdir().expect("tempdir");
    let regular_path = dir.path().join("regular.zip");
    write_zip(
        &regular_path,
        &[
            ("routes.txt", "route_id\nF\nGS\n"),
            ("trips.txt", REGULAR_TRIPS),
            ("stop_times.txt", REGULAR_STOP_TIMES),
        ],
    );
    let supplemented_dir = dir.path().join("supplemented");
    fs::create_dir(&supplemented_dir).expect("mkdir");
    fs::write(supplemented_dir.join("routes.txt"), "route_id\nF\nFX\n").expect("write routes");
    fs::write(
        supplemented_dir.join("trips.txt"),
        "route_id,service_id,trip_id,direction_id\n\
         F,WKD,s1,0\n\
         FX,WKD,s2,0\n",
    )
    .expect("write trips");
    fs::write(
        supplemented_dir.join("stop_times.txt"),
        "trip_id,arrival_time,stop_id,stop_sequence\n\
         s1,08:00:00,F01,1\n\
         s1,08:10:00,F03,2\n\
         s2,09:00:00,F01,1\n",
    )
    .expect("write stop_times");

    let regular = load_feed(&regular_path).expect("regular");
    let supplemented = load_feed(&supplemented_dir).expect("supplemented");
    let comparison = compare_routes(&regular, &supplemented);

    assert_eq!(comparison.regular.trips, 3);
    assert_eq!(comparison.supplemented.stops, 2);
    assert_eq!(comparison.regular_routes, set(&["F", "GS"]));
    assert_eq!(comparison.only_in_regular, set(&["GS"]));
    assert_eq!(comparison.only_in_supplemented, set(&["FX"]));

    let diff = compare_route_patterns(
        &route_patterns(&regular, "F", false),
        &route_patterns(&supplemented, "F", false),
    );
    assert_eq!(diff.direction_0[0].pattern_type, PatternChange::SkipStops);
    assert_eq!(diff.direction_0[0].skipped_stops, stops(&["F02"]));
}

#[test]
fn routes_fall_back_to_trip_route_ids() {
    let regular = load_feed_from(&[
        ("trips.txt", REGULAR_TRIPS),
        ("stop_times.txt", REGULAR_STOP_TIMES),
    ]);
    assert!(regular.routes.is_empty());
    assert_eq!(regular.route_ids(), set(&["F", "GS"]));
}

fn load_feed_from(tables: &[(&str, &str)]) -> ps_analyzer::schedule::gtfs::GtfsFeed {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, body) in tables {
        fs::write(dir.path().join(name), body).expect("write table");
    }
    load_feed(dir.path()).expect("feed loads")
}
