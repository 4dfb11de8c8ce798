use ps_analyzer::{
    data::{normalize, FeedEntity, Normalized, SourceMethod},
    errors::AlertError,
};
use serde_json::json;

fn entity(alert: serde_json::Value) -> FeedEntity {
    FeedEntity::new(json!({ "id": "lmm:planned_work:1", "alert": alert }))
}

fn expect_record(entity: &FeedEntity) -> ps_analyzer::data::AlertRecord {
    match normalize(entity).expect("recognizable alert") {
        Normalized::Record(record) => record,
        Normalized::Skip => panic!("unexpected skip"),
    }
}

#[test]
fn reads_nested_fields() {
    let e = entity(json!({
        "active_period": [{ "start": 1_700_000_500, "end": 1_700_010_000 }, { "start": 1_700_000_000 }],
        "informed_entity": [
            { "agency_id": "MTASBWY", "route_id": "F" },
            { "agency_id": "MTASBWY", "route_id": "D" },
            { "agency_id": "MTASBWY", "route_id": "F" },
            { "agency_id": "MTASBWY", "stop_id": "F14" }
        ],
        "header_text": { "translation": [{ "text": "[F] trains run via the [D]", "language": "en" }] },
        "description_text": { "translation": [{ "text": "Take the [D] instead." }] },
        "transit_realtime.mercury_alert": {
            "alert_type": "Planned - Reroute",
            "human_readable_active_period": { "translation": [{ "text": "Nov 4 - 8, Mon to Fri, 9:45 PM to 5 AM" }] }
        }
    }));
    let record = expect_record(&e);
    assert_eq!(record.alert_type, "Planned - Reroute");
    assert_eq!(record.header_text, "[F] trains run via the [D]");
    assert_eq!(record.description_text, "Take the [D] instead.");
    assert_eq!(record.active_period_text, "Nov 4 - 8, Mon to Fri, 9:45 PM to 5 AM");
    assert_eq!(record.start_timestamp, Some(1_700_000_000));
    assert_eq!(record.lines_display(), "D, F");
    assert_eq!(record.source_method, SourceMethod::Feed);
    assert_eq!(record.category, None);
}

#[test]
fn missing_nesting_defaults_to_empty() {
    let record = expect_record(&entity(json!({
        "header_text": { "translation": [] },
        "transit_realtime.mercury_alert": {}
    })));
    assert_eq!(record.alert_type, "");
    assert_eq!(record.header_text, "");
    assert_eq!(record.description_text, "");
    assert_eq!(record.active_period_text, "");
    assert!(record.affected_lines.is_empty());
}

#[test]
fn zero_intervals_leave_start_absent() {
    let record = expect_record(&entity(json!({ "active_period": [] })));
    assert_eq!(record.start_timestamp, None);

    let record = record_without_starts();
    assert_eq!(record.start_timestamp, None);
}

fn record_without_starts() -> ps_analyzer::data::AlertRecord {
    expect_record(&entity(json!({ "active_period": [{ "end": 1_700_000_000 }, {}] })))
}

#[test]
fn fractional_starts_are_truncated() {
    let record = expect_record(&entity(json!({
        "active_period": [{ "start": 1.7e9 }, { "start": "1700000000.75" }, { "start": 1_700_000_003 }]
    })));
    assert_eq!(record.start_timestamp, Some(1_700_000_000));
}

#[test]
fn unusable_starts_are_ignored() {
    let record = expect_record(&entity(json!({
        "active_period": [{ "start": -12.5 }, { "start": "soon" }, { "start": 1_700_000_042.9 }]
    })));
    assert_eq!(record.start_timestamp, Some(1_700_000_042));

    let record = expect_record(&entity(json!({
        "active_period": [{ "start": -1.0 }, { "start": null }]
    })));
    assert_eq!(record.start_timestamp, None);
}

#[test]
fn string_encoded_starts_are_accepted() {
    let record = expect_record(&entity(json!({
        "active_period": [{ "start": "1700000900" }, { "start": 1_700_000_100 }]
    })));
    assert_eq!(record.start_timestamp, Some(1_700_000_100));
    assert!(record.start_time().is_some());
}

#[test]
fn reduced_service_is_skipped() {
    let e = entity(json!({
        "transit_realtime.mercury_alert": { "alert_type": "Planned - Reduced Service" }
    }));
    assert_eq!(normalize(&e), Ok(Normalized::Skip));
}

#[test]
fn reduced_service_match_is_case_sensitive() {
    let e = entity(json!({
        "transit_realtime.mercury_alert": { "alert_type": "Planned - reduced service" }
    }));
    assert!(matches!(normalize(&e), Ok(Normalized::Record(_))));
}

#[test]
fn non_alert_entity_is_malformed() {
    let e = FeedEntity::new(json!({ "id": "trip-1", "trip_update": {} }));
    assert!(matches!(normalize(&e), Err(AlertError::MalformedEntity(_))));

    let e = FeedEntity::new(json!({ "id": "x", "alert": "not an object" }));
    assert!(matches!(normalize(&e), Err(AlertError::MalformedEntity(_))));
}
