//! Canonical in-memory representation of one service-change alert.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extraction strategy that produced a record. Provenance only; categorization ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceMethod {
    /// Deterministic pattern matching over free text.
    TextPattern,
    /// First external model backend (OpenAI chat completions).
    ModelBackendA,
    /// Second external model backend (Ollama generate).
    ModelBackendB,
    /// Structured real-time feed entity.
    Feed,
}

impl SourceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPattern => "regex",
            Self::ModelBackendA => "openai",
            Self::ModelBackendB => "ollama",
            Self::Feed => "feed",
        }
    }
}

impl fmt::Display for SourceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed alert classification, declared in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Replacement Shuttles")]
    ReplacementShuttles,
    #[serde(rename = "Reroute")]
    Reroute,
    #[serde(rename = "Run Local")]
    RunLocal,
    #[serde(rename = "Suspended")]
    Suspended,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ReplacementShuttles,
        Category::Reroute,
        Category::RunLocal,
        Category::Suspended,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ReplacementShuttles => "Replacement Shuttles",
            Self::Reroute => "Reroute",
            Self::RunLocal => "Run Local",
            Self::Suspended => "Suspended",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Suspended segment of a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suspension {
    pub line: String,
    pub from: String,
    pub to: String,
}

/// Free-text change attached to a line (reroute or alternate service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetail {
    pub line: String,
    pub detail: String,
}

/// Structured service changes, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceChanges {
    pub suspensions: Vec<Suspension>,
    pub reroutes: Vec<LineDetail>,
    pub alternate_service: Vec<LineDetail>,
}

impl ServiceChanges {
    pub fn is_empty(&self) -> bool {
        self.suspensions.is_empty() && self.reroutes.is_empty() && self.alternate_service.is_empty()
    }
}

/// One normalized alert.
///
/// Text fields default to empty strings; `start_timestamp` is epoch seconds and
/// is `None` when no active period carries a start. `category` is only set by
/// [`AlertRecord::categorized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub affected_lines: BTreeSet<String>,
    pub alert_type: String,
    pub header_text: String,
    pub description_text: String,
    pub active_period_text: String,
    pub start_timestamp: Option<i64>,
    pub service_changes: ServiceChanges,
    pub source_method: SourceMethod,
    pub category: Option<Category>,
    /// Failure note for degraded extractions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AlertRecord {
    /// Empty record for the given strategy.
    pub fn new(source_method: SourceMethod) -> Self {
        Self {
            affected_lines: BTreeSet::new(),
            alert_type: String::new(),
            header_text: String::new(),
            description_text: String::new(),
            active_period_text: String::new(),
            start_timestamp: None,
            service_changes: ServiceChanges::default(),
            source_method,
            category: None,
            error: None,
        }
    }

    /// Record standing in for a failed extraction: no lines, no changes, error attached.
    pub fn degraded(source_method: SourceMethod, raw_text: &str, error: impl fmt::Display) -> Self {
        let mut record = Self::new(source_method);
        record.description_text = raw_text.to_string();
        record.error = Some(error.to_string());
        record
    }

    /// Build a line set, dropping blanks and duplicates.
    pub fn collect_lines<I, S>(lines: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.affected_lines = Self::collect_lines(lines);
        self
    }

    /// Attach the category label. The only mutation a record sees after construction.
    pub fn categorized(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Sorted, comma-joined line identifiers for reports.
    pub fn lines_display(&self) -> String {
        self.affected_lines
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_timestamp
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

/// True for alerts that are dropped before categorization.
pub fn is_reduced_service(alert_type: &str) -> bool {
    alert_type.contains("Reduced Service")
}
