//! Common types for version lookups

use chrono::{DateTime, Utc};

/// One version offered by a version source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub version: String,
    pub released_at: Option<DateTime<Utc>>,
    /// Prerelease flag as reported by the source (advisory only)
    pub prerelease: bool,
    /// Synthesized from a package's single reported version because the
    /// source listed no versions. Used unfiltered only as a last resort.
    pub fallback: bool,
}

impl VersionCandidate {
    /// A listed version without timestamp or prerelease metadata
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            released_at: None,
            prerelease: false,
            fallback: false,
        }
    }

    pub fn with_release_date(mut self, released_at: DateTime<Utc>) -> Self {
        self.released_at = Some(released_at);
        self
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}
