//! Snapshot and CSV formats

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{InterestOverTime, TrendsSnapshot};

pub const SNAPSHOT_JSON_NAME: &str = "trends_snapshot.json";
pub const INTEREST_CSV_NAME: &str = "trends_data.csv";

const CSV_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read a snapshot written by `ArticleWriter::save_snapshot`
pub fn load_snapshot(path: &Path) -> Result<TrendsSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the interest table as CSV: a `date` column then one column per
/// keyword, in query order
pub fn interest_to_csv(interest: &InterestOverTime) -> String {
    let keywords = interest.keywords();

    let mut out = String::from("date");
    for keyword in &keywords {
        out.push(',');
        out.push_str(&csv_field(keyword));
    }
    out.push('\n');

    for (row, timestamp) in interest.timestamps.iter().enumerate() {
        out.push_str(&timestamp.format(CSV_DATE_FORMAT).to_string());
        for keyword in &keywords {
            let value = interest
                .column(keyword)
                .and_then(|column| column.get(row))
                .copied()
                .unwrap_or(0);
            out.push(',');
            out.push_str(&value.to_string());
        }
        out.push('\n');
    }

    out
}
