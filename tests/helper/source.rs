//! Version source test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;

use helmfile_audit::config::SourceKind;
use helmfile_audit::version::error::SourceError;
use helmfile_audit::version::{LookupOptions, Reconciler, VersionCandidate, VersionSource};

/// In-memory version source counting its queries
#[derive(Default)]
pub struct StaticSource {
    versions: HashMap<String, Vec<VersionCandidate>>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, chart: &str, versions: Vec<&str>) -> Self {
        self.versions.insert(
            chart.to_string(),
            versions.into_iter().map(VersionCandidate::new).collect(),
        );
        self
    }

    /// Register a single version released at `ts` (UNIX seconds)
    pub fn with_release(mut self, chart: &str, version: &str, ts: i64) -> Self {
        let mut candidate = VersionCandidate::new(version);
        if let Some(released_at) = DateTime::from_timestamp(ts, 0) {
            candidate = candidate.with_release_date(released_at);
        }
        self.versions.insert(chart.to_string(), vec![candidate]);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionSource for StaticSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ArtifactHub
    }

    async fn query(&self, chart: &str) -> Result<Vec<VersionCandidate>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.versions
            .get(chart)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(chart.to_string()))
    }
}

/// Reconciler over `source` with no stagger or retries
pub fn create_test_reconciler(source: Arc<StaticSource>) -> Reconciler {
    let options = LookupOptions {
        stagger_delay: std::time::Duration::ZERO,
        max_retries: 0,
        ..LookupOptions::default()
    };
    Reconciler::new(source, options)
}
