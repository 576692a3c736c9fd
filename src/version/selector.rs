//! Latest stable version selection
//!
//! Ranking uses the tuple of decimal-digit runs in a version string, so
//! `1.10.0` beats `1.9.0` and `v1.2` compares the same as `1.2`. Tuples compare
//! lexicographically without zero padding: `(1, 2)` < `(1, 2, 0)`.

use std::sync::LazyLock;

use regex::Regex;

use crate::version::types::VersionCandidate;

/// Substrings marking a version as not production-ready regardless of what
/// the source reported
pub const PRERELEASE_MARKERS: &[&str] = &["-pre", "-beta", "-rc"];

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run pattern is valid"));

/// Extract the numeric ranking key: `1.12.4-alpha` -> `[1, 12, 4]`
pub fn numeric_tuple(version: &str) -> Vec<u64> {
    DIGIT_RUNS
        .find_iter(version)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .collect()
}

/// Whether the candidate is a prerelease by flag or by version marker
pub fn is_prerelease(candidate: &VersionCandidate) -> bool {
    if candidate.prerelease {
        return true;
    }
    let version = candidate.version.to_ascii_lowercase();
    PRERELEASE_MARKERS
        .iter()
        .any(|marker| version.contains(marker))
}

/// Pick the latest stable candidate.
///
/// Prereleases are dropped, the greatest numeric tuple wins and ties keep the
/// first-seen candidate. When nothing survives, a fallback candidate offered by
/// the source is returned as is.
pub fn select_latest(candidates: &[VersionCandidate]) -> Option<&VersionCandidate> {
    let mut best: Option<(&VersionCandidate, Vec<u64>)> = None;

    for candidate in candidates.iter().filter(|c| !is_prerelease(c)) {
        let key = numeric_tuple(&candidate.version);
        if best.as_ref().is_none_or(|(_, best_key)| key > *best_key) {
            best = Some((candidate, key));
        }
    }

    best.map(|(candidate, _)| candidate)
        .or_else(|| candidates.iter().find(|c| c.fallback))
}
