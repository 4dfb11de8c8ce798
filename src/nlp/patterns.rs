//! Deterministic pattern extraction over free-text alerts.
//!
//! Only bracketed line tokens, "No X service between A and B" and
//! "X trains rerouted" are recognised. Alternate service, skip-stop and
//! running-section changes stay empty for this extractor.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::record::{AlertRecord, LineDetail, SourceMethod, Suspension};

static LINE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Z0-9])\]").expect("valid regex"));

static SUSPENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"No\s+([A-Z0-9]+)\s+service\s+between\s+(.*?)\s+and\s+(.*?)(?:\n|$)")
        .expect("valid regex")
});

static REROUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z0-9]+)\s+trains\s+rerouted").expect("valid regex"));

/// Pattern-based extractor. Never fails; unmatched text yields an empty record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextAlertExtractor;

impl TextAlertExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, raw_text: &str) -> AlertRecord {
        let mut record =
            AlertRecord::new(SourceMethod::TextPattern).with_lines(bracketed_lines(raw_text));
        record.description_text = raw_text.to_string();
        record.service_changes.suspensions = suspensions(raw_text);
        record.service_changes.reroutes = reroutes(raw_text);
        record
    }
}

/// Every `[X]` token, in order of appearance (duplicates included).
pub fn bracketed_lines(text: &str) -> Vec<String> {
    LINE_TOKEN
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn suspensions(text: &str) -> Vec<Suspension> {
    SUSPENSION
        .captures_iter(text)
        .map(|caps| Suspension {
            line: caps[1].to_string(),
            from: caps[2].trim().to_string(),
            to: caps[3].trim().to_string(),
        })
        .collect()
}

fn reroutes(text: &str) -> Vec<LineDetail> {
    REROUTE
        .captures_iter(text)
        .map(|caps| LineDetail {
            line: caps[1].to_string(),
            detail: caps[0].to_string(),
        })
        .collect()
}
