//! Artifact Hub package API implementation

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourceKind;
use crate::version::error::SourceError;
use crate::version::source::VersionSource;
use crate::version::types::VersionCandidate;

/// Placeholder in the URL template replaced by the chart key
const CHART_PLACEHOLDER: &str = "{}";

/// Response from the package metadata endpoint
#[derive(Debug, Deserialize)]
struct PackageResponse {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    available_versions: Option<Vec<AvailableVersion>>,
}

/// Entry of `available_versions`
#[derive(Debug, Deserialize)]
struct AvailableVersion {
    version: String,
    /// Release time as UNIX seconds
    #[serde(default)]
    ts: Option<i64>,
    #[serde(default)]
    prerelease: bool,
}

/// Version source backed by a package registry HTTP API
#[derive(Clone)]
pub struct ArtifactHubSource {
    client: reqwest::Client,
    url_template: String,
}

impl ArtifactHubSource {
    /// Creates a source for an endpoint template such as
    /// `https://artifacthub.io/api/v1/packages/helm/{}`
    pub fn new(url_template: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("helmfile-audit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    fn package_url(&self, chart: &str) -> String {
        if self.url_template.contains(CHART_PLACEHOLDER) {
            self.url_template.replace(CHART_PLACEHOLDER, chart)
        } else {
            format!("{}/{}", self.url_template.trim_end_matches('/'), chart)
        }
    }
}

#[async_trait::async_trait]
impl VersionSource for ArtifactHubSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ArtifactHub
    }

    async fn query(&self, chart: &str) -> Result<Vec<VersionCandidate>, SourceError> {
        let url = self.package_url(chart);
        debug!("Fetching package metadata: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(chart.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SourceError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            warn!("Package API returned status {}: {}", status, url);
            return Err(SourceError::Unavailable(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.text().await?;
        Ok(parse_package_response(chart, &body))
    }
}

/// Map a metadata body into candidates; empty or malformed bodies give none
fn parse_package_response(chart: &str, body: &str) -> Vec<VersionCandidate> {
    if body.trim().is_empty() {
        warn!("Empty package metadata for {}", chart);
        return Vec::new();
    }

    let package: PackageResponse = match serde_json::from_str(body) {
        Ok(package) => package,
        Err(e) => {
            warn!("Failed to parse package metadata for {}: {}", chart, e);
            return Vec::new();
        }
    };

    let listed: Vec<VersionCandidate> = package
        .available_versions
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !v.version.trim().is_empty())
        .map(|v| {
            let candidate = VersionCandidate::new(v.version).with_prerelease(v.prerelease);
            match v.ts.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
                Some(released_at) => candidate.with_release_date(released_at),
                None => candidate,
            }
        })
        .collect();

    if !listed.is_empty() {
        debug!("Found {} versions for chart {}", listed.len(), chart);
        return listed;
    }

    // No version list: fall back to the package's current version
    package
        .version
        .filter(|v| !v.trim().is_empty())
        .map(|v| vec![VersionCandidate::new(v).as_fallback()])
        .unwrap_or_default()
}
