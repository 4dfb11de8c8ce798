//! Categorization and per-category summary layer.

pub mod categorize;
pub mod export;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::data::{
    feed::{normalize, FeedEntity, Normalized},
    record::{AlertRecord, Category},
};

pub use categorize::categorize;

/// One summarized alert with its report-ready fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    /// Sorted, comma-joined route identifiers.
    pub line: String,
    /// Human-readable active period.
    pub date: String,
    pub record: AlertRecord,
}

impl SummaryRow {
    fn from_record(record: AlertRecord) -> Self {
        Self {
            line: record.lines_display(),
            date: record.active_period_text.clone(),
            record,
        }
    }
}

/// Categorized alerts. Only non-empty categories are present, iterated in priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    pub groups: BTreeMap<Category, Vec<SummaryRow>>,
    /// Entities dropped by the Reduced Service filter.
    pub filtered: usize,
    /// Entities skipped because they were not recognizable alerts.
    pub malformed: usize,
}

impl AlertSummary {
    pub fn get(&self, category: Category) -> Option<&[SummaryRow]> {
        self.groups.get(&category).map(Vec::as_slice)
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.groups.keys().copied()
    }
}

/// Normalize, filter and categorize entities into per-category groups.
///
/// Input order is preserved inside each group.
pub fn summarize<'a, I>(entities: I) -> AlertSummary
where
    I: IntoIterator<Item = &'a FeedEntity>,
{
    let mut summary = AlertSummary::default();
    for entity in entities {
        match normalize(entity) {
            Ok(Normalized::Record(record)) => {
                let category = categorize(&record);
                summary
                    .groups
                    .entry(category)
                    .or_default()
                    .push(SummaryRow::from_record(record.categorized(category)));
            }
            Ok(Normalized::Skip) => summary.filtered += 1,
            Err(err) => {
                warn!(%err, "skipping malformed entity");
                summary.malformed += 1;
            }
        }
    }
    info!(
        alerts = summary.total(),
        categories = summary.groups.len(),
        filtered = summary.filtered,
        malformed = summary.malformed,
        "built alert summary"
    );
    summary
}

/// Normalized alerts for a single-line view, earliest start first; undated alerts last.
pub fn timeline<'a, I>(entities: I) -> Vec<AlertRecord>
where
    I: IntoIterator<Item = &'a FeedEntity>,
{
    let mut records: Vec<AlertRecord> = entities
        .into_iter()
        .filter_map(|entity| match normalize(entity) {
            Ok(Normalized::Record(record)) => Some(record),
            Ok(Normalized::Skip) => None,
            Err(err) => {
                warn!(%err, "skipping malformed entity");
                None
            }
        })
        .collect();
    records.sort_by_key(|record| (record.start_timestamp.is_none(), record.start_timestamp));
    records
}
