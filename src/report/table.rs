//! Comparison table across manifests

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::manifest::ManifestSource;
use crate::version::resolution::Resolution;

/// Rendered for a chart a manifest does not declare, or an unknown latest version
pub const PLACEHOLDER: &str = "-";

pub const CHART_HEADER: &str = "Chart";
pub const LATEST_HEADER: &str = "Latest Version";
pub const AGE_LABEL: &str = "Last modified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Declared version differs from the known latest version
    pub different: bool,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            different: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub chart: String,
    pub latest: Cell,
    /// One cell per manifest, in manifest order
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    /// Per-manifest age of the source file, aligned with the manifest columns
    pub age_row: Option<Vec<String>>,
    pub rows: Vec<ReportRow>,
}

/// Build the comparison table.
///
/// `resolutions` holds one resolution per manifest for every chart, aligned
/// with `sources`. Rows come out sorted by chart name (ordinal). The age row is
/// included when `age_reference` is given.
pub fn build_table(
    sources: &[ManifestSource],
    resolutions: &BTreeMap<String, Vec<Resolution>>,
    age_reference: Option<DateTime<Utc>>,
) -> ReportTable {
    let headers = [CHART_HEADER.to_string(), LATEST_HEADER.to_string()]
        .into_iter()
        .chain(sources.iter().map(|s| s.label.clone()))
        .collect();

    let age_row = age_reference.map(|now| {
        sources
            .iter()
            .map(|s| {
                s.last_modified
                    .map_or_else(|| PLACEHOLDER.to_string(), |modified| format_age(now - modified))
            })
            .collect()
    });

    let rows = resolutions
        .iter()
        .map(|(chart, per_manifest)| build_row(chart, per_manifest, sources.len()))
        .collect();

    ReportTable {
        headers,
        age_row,
        rows,
    }
}

fn build_row(chart: &str, per_manifest: &[Resolution], columns: usize) -> ReportRow {
    let latest_version = per_manifest
        .iter()
        .find_map(|r| r.latest_version.as_deref());

    let cells = (0..columns)
        .map(|i| match per_manifest.get(i).and_then(|r| r.declared.as_str()) {
            Some(version) => Cell {
                text: version.to_string(),
                different: latest_version.is_some_and(|latest| latest != version),
            },
            None => Cell::plain(PLACEHOLDER),
        })
        .collect();

    ReportRow {
        chart: chart.to_string(),
        latest: Cell::plain(latest_version.unwrap_or(PLACEHOLDER)),
        cells,
    }
}

/// Coarse human-readable age: `just now`, `5 minutes ago`, `3 days ago`
pub fn format_age(age: chrono::TimeDelta) -> String {
    let (value, unit) = if age.num_days() > 0 {
        (age.num_days(), "day")
    } else if age.num_hours() > 0 {
        (age.num_hours(), "hour")
    } else if age.num_minutes() > 0 {
        (age.num_minutes(), "minute")
    } else {
        return "just now".to_string();
    };

    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}
