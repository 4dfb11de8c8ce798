//! Keyword-priority alert categorization.

use crate::data::record::{AlertRecord, Category};

/// Keyword sets in priority order; the first set with a hit decides the category.
const RULES: &[(Category, &[&str])] = &[
    (
        Category::ReplacementShuttles,
        &["shuttle", "free shuttle", "replacement bus"],
    ),
    (
        Category::Reroute,
        &["via", "rerouted", "skip", "bypass", "two sections", "detour"],
    ),
    (
        Category::RunLocal,
        &["local", "express to local", "making local stops"],
    ),
    (
        Category::Suspended,
        &["suspended", "no service", "not running"],
    ),
];

/// Lowercased `header description type` text the keywords are matched against.
pub fn search_text(header: &str, description: &str, alert_type: &str) -> String {
    format!("{header} {description} {alert_type}").to_lowercase()
}

pub fn categorize_text(header: &str, description: &str, alert_type: &str) -> Category {
    let text = search_text(header, description, alert_type);
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Classify a record. Always returns exactly one category.
pub fn categorize(record: &AlertRecord) -> Category {
    categorize_text(
        &record.header_text,
        &record.description_text,
        &record.alert_type,
    )
}
