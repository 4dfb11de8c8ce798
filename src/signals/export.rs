//! CSV export of an [`AlertSummary`], one file per category.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{data::record::Category, signals::AlertSummary};

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Line")]
    line: &'a str,
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Type")]
    alert_type: &'a str,
    #[serde(rename = "Impact")]
    impact: &'a str,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "In GTFS")]
    in_gtfs: &'a str,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

/// `Replacement Shuttles` -> `replacement_shuttles.csv`
pub fn file_name(category: Category) -> String {
    format!("{}.csv", category.label().to_lowercase().replace(' ', "_"))
}

/// Write each non-empty category to `<dir>/<category>.csv`, returning the written paths.
pub fn write_summary_csv(summary: &AlertSummary, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {dir:?}"))?;
    let mut written = Vec::new();
    for (category, rows) in &summary.groups {
        if rows.is_empty() {
            continue;
        }
        let path = dir.join(file_name(*category));
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("create {path:?}"))?;
        for row in rows {
            writer.serialize(ExportRow {
                line: &row.line,
                date: &row.date,
                alert_type: &row.record.alert_type,
                impact: &row.record.header_text,
                description: &row.record.description_text,
                in_gtfs: "",
                notes: "",
            })?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = rows.len(), %category, "wrote summary csv");
        written.push(path);
    }
    Ok(written)
}
