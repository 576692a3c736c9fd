//! Per-chart reconciliation result

use chrono::{DateTime, Utc};

use crate::version::types::VersionCandidate;

/// What a manifest pins for a chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredVersion {
    Declared(String),
    /// The chart appears in another manifest of the run but not this one
    NotDeclared,
}

impl DeclaredVersion {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DeclaredVersion::Declared(version) => Some(version),
            DeclaredVersion::NotDeclared => None,
        }
    }
}

impl From<Option<&str>> for DeclaredVersion {
    fn from(value: Option<&str>) -> Self {
        value.map_or(DeclaredVersion::NotDeclared, |v| {
            DeclaredVersion::Declared(v.to_string())
        })
    }
}

/// Declared vs. latest for one chart in one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub chart: String,
    pub declared: DeclaredVersion,
    /// `None` when the source produced no usable candidate
    pub latest_version: Option<String>,
    pub latest_timestamp: Option<DateTime<Utc>>,
    pub is_stale: bool,
}

impl Resolution {
    pub fn new(
        chart: impl Into<String>,
        declared: DeclaredVersion,
        latest: Option<&VersionCandidate>,
    ) -> Self {
        let latest_version = latest.map(|c| c.version.clone());
        // Literal comparison: "v1.3.0" vs "1.3.0" is still stale
        let is_stale = match (&declared, &latest_version) {
            (DeclaredVersion::Declared(declared), Some(latest)) => declared != latest,
            _ => false,
        };

        Self {
            chart: chart.into(),
            declared,
            latest_version,
            latest_timestamp: latest.and_then(|c| c.released_at),
            is_stale,
        }
    }
}
