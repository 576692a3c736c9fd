//! Reconciliation of declared chart versions against a version source

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::LookupConfig;
use crate::manifest::ManifestSource;
use crate::version::error::SourceError;
use crate::version::resolution::{DeclaredVersion, Resolution};
use crate::version::selector::select_latest;
use crate::version::source::VersionSource;
use crate::version::types::VersionCandidate;

/// Timing and retry policy for lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    pub timeout: Duration,
    pub stagger_delay: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl From<&LookupConfig> for LookupOptions {
    fn from(config: &LookupConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            stagger_delay: Duration::from_millis(config.stagger_delay_ms),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::from(&LookupConfig::default())
    }
}

/// Resolves every chart of a run against one version source.
///
/// Each distinct chart is queried once per call regardless of how many
/// manifests reference it.
pub struct Reconciler {
    source: Arc<dyn VersionSource>,
    options: LookupOptions,
}

impl Reconciler {
    pub fn new(source: Arc<dyn VersionSource>, options: LookupOptions) -> Self {
        Self { source, options }
    }

    /// Resolve the union of charts across manifests.
    ///
    /// Each value holds one resolution per manifest, in the order of `sources`;
    /// manifests without the chart get [`DeclaredVersion::NotDeclared`].
    pub async fn resolve(&self, sources: &[ManifestSource]) -> BTreeMap<String, Vec<Resolution>> {
        let charts: BTreeSet<&str> = sources
            .iter()
            .flat_map(|source| source.releases.keys().map(String::as_str))
            .collect();

        let latest = self.lookup_latest(&charts).await;

        charts
            .into_iter()
            .map(|chart| {
                let candidate = latest.get(chart).and_then(Option::as_ref);
                let resolutions = sources
                    .iter()
                    .map(|source| {
                        Resolution::new(
                            chart,
                            DeclaredVersion::from(source.declared(chart)),
                            candidate,
                        )
                    })
                    .collect();
                (chart.to_string(), resolutions)
            })
            .collect()
    }

    /// Resolve the charts of a single manifest
    pub async fn resolve_one(&self, source: &ManifestSource) -> BTreeMap<String, Resolution> {
        self.resolve(std::slice::from_ref(source))
            .await
            .into_iter()
            .filter_map(|(chart, mut resolutions)| resolutions.pop().map(|r| (chart, r)))
            .collect()
    }

    /// Look up all charts in parallel and wait for every lookup to finish.
    /// Start times are staggered to avoid rate limiting.
    async fn lookup_latest(&self, charts: &BTreeSet<&str>) -> HashMap<String, Option<VersionCandidate>> {
        info!("Looking up {} charts via {:?}", charts.len(), self.source.kind());

        let futures = charts.iter().enumerate().map(|(i, chart)| {
            let delay = self.options.stagger_delay.saturating_mul(i as u32);
            async move {
                sleep(delay).await;
                let candidates = self.query_with_retry(chart).await;
                let latest = select_latest(&candidates).cloned();
                match &latest {
                    Some(candidate) => debug!("Latest {} is {}", chart, candidate.version),
                    None => info!("No usable version for {}", chart),
                }
                (chart.to_string(), latest)
            }
        });

        join_all(futures).await.into_iter().collect()
    }

    /// Query one chart, retrying transient failures with exponential backoff.
    /// Any failure ends as an empty candidate list.
    async fn query_with_retry(&self, chart: &str) -> Vec<VersionCandidate> {
        let timeout_ms = self.options.timeout.as_millis() as u64;
        let mut attempt = 0;

        loop {
            let result = timeout(self.options.timeout, self.source.query(chart))
                .await
                .unwrap_or(Err(SourceError::Timeout(timeout_ms)));

            match result {
                Ok(candidates) => {
                    debug!("Fetched {} candidates for {}", candidates.len(), chart);
                    return candidates;
                }
                Err(SourceError::RateLimited {
                    retry_after_secs: Some(secs),
                }) if Duration::from_secs(secs) > self.options.timeout => {
                    warn!(
                        "Lookup of {} rate limited for {}s, longer than the {:?} lookup timeout; giving up",
                        chart, secs, self.options.timeout
                    );
                    return Vec::new();
                }
                Err(e) if e.is_transient() && attempt < self.options.max_retries => {
                    let backoff = match &e {
                        SourceError::RateLimited {
                            retry_after_secs: Some(secs),
                        } => Duration::from_secs(*secs),
                        _ => self
                            .options
                            .retry_backoff
                            .saturating_mul(2u32.saturating_pow(attempt)),
                    };
                    warn!(
                        "Lookup of {} failed ({}), retrying in {:?}",
                        chart, e, backoff
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(SourceError::NotFound(_)) => {
                    info!("Chart not found in source: {}", chart);
                    return Vec::new();
                }
                Err(e) => {
                    warn!("Failed to look up {}: {}", chart, e);
                    return Vec::new();
                }
            }
        }
    }
}
