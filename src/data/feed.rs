//! Structured real-time alert entities and their normalization into [`AlertRecord`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    data::record::{is_reduced_service, AlertRecord, SourceMethod},
    errors::AlertError,
};

const ALERT_TYPE: &str = "/transit_realtime.mercury_alert/alert_type";
const HEADER_TEXT: &str = "/header_text/translation/0/text";
const DESCRIPTION_TEXT: &str = "/description_text/translation/0/text";
const ACTIVE_PERIOD_TEXT: &str =
    "/transit_realtime.mercury_alert/human_readable_active_period/translation/0/text";

/// Top-level feed payload as returned by the alerts endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedMessage {
    #[serde(default)]
    pub header: Option<Value>,
    #[serde(default)]
    pub entity: Vec<FeedEntity>,
}

/// One raw feed entity. Kept as loose JSON; every field is read through [`text_at`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedEntity(pub Value);

impl FeedEntity {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The nested alert object, if this entity is an alert at all.
    pub fn alert(&self) -> Result<&Value, AlertError> {
        let id = self.id();
        match self.0.get("alert") {
            Some(alert) if alert.is_object() => Ok(alert),
            Some(_) => Err(AlertError::MalformedEntity(format!(
                "entity {id}: `alert` is not an object"
            ))),
            None => Err(AlertError::MalformedEntity(format!(
                "entity {id}: no `alert` field"
            ))),
        }
    }

    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or("<unknown>")
    }
}

/// Outcome of normalizing one entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Record(AlertRecord),
    /// Filtered out before categorization (Reduced Service).
    Skip,
}

/// String at a JSON pointer, or empty when any level is absent or not a string.
pub fn text_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Earliest `start` across the alert's active periods; `None` if no period has one.
pub fn earliest_start(alert: &Value) -> Option<i64> {
    alert
        .get("active_period")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|period| {
            let start = period.get("start")?;
            let seconds = epoch_seconds(start);
            if seconds.is_none() {
                debug!(%start, "ignoring unusable active period start");
            }
            seconds
        })
        .min()
}

/// Whole epoch seconds from an integer, a float (truncated) or a numeric string.
fn epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|v| i64::try_from(v).ok()))
            .or_else(|| n.as_f64().and_then(truncate_seconds)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_seconds))
        }
        _ => None,
    }
}

fn truncate_seconds(value: f64) -> Option<i64> {
    (value.is_finite() && value >= 0.0 && value < i64::MAX as f64).then(|| value.trunc() as i64)
}

/// Route identifiers named by the alert's informed entities, in feed order.
pub fn route_ids(alert: &Value) -> Vec<String> {
    alert
        .get("informed_entity")
        .and_then(Value::as_array)
        .map(|entities| {
            entities
                .iter()
                .filter_map(|informed| informed.get("route_id").and_then(Value::as_str))
                .filter(|route| !route.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Convert one feed entity into a record, or skip it when it is a Reduced Service alert.
pub fn normalize(entity: &FeedEntity) -> Result<Normalized, AlertError> {
    let alert = entity.alert()?;
    let alert_type = text_at(alert, ALERT_TYPE);
    if is_reduced_service(&alert_type) {
        debug!(entity = entity.id(), %alert_type, "skipping reduced service alert");
        return Ok(Normalized::Skip);
    }

    let mut record = AlertRecord::new(SourceMethod::Feed).with_lines(route_ids(alert));
    record.alert_type = alert_type;
    record.header_text = text_at(alert, HEADER_TEXT);
    record.description_text = text_at(alert, DESCRIPTION_TEXT);
    record.active_period_text = text_at(alert, ACTIVE_PERIOD_TEXT);
    record.start_timestamp = earliest_start(alert);
    Ok(Normalized::Record(record))
}
