//! Common types for release manifests

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::manifest::parser::{HelmfileDocument, ReleaseEntry};

/// Scheme prefixes that reference a chart by location rather than by
/// repository alias. The scheme, host and repository path are dropped so the
/// trailing chart name becomes the lookup key.
const LOCATION_SCHEMES: &[&str] = &["oci://"];

/// A chart reference pinned to a version inside one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Normalized chart identifier used as the lookup key
    pub chart: String,
    /// Version string exactly as written in the manifest (quotes removed)
    pub declared_version: String,
}

impl Release {
    /// Apply the extraction rule to a raw entry: both chart and version must be
    /// present and non-empty.
    pub fn from_entry(entry: &ReleaseEntry) -> Option<Self> {
        let chart = normalize_chart(entry.chart.as_deref()?);
        let version = entry.version.as_deref()?.trim();
        if chart.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self {
            chart,
            declared_version: version.to_string(),
        })
    }
}

/// One parsed input manifest
#[derive(Debug, Clone)]
pub struct ManifestSource {
    pub path: PathBuf,
    /// Column label used by the reporter
    pub label: String,
    /// chart -> declared version, in first-seen order; duplicates keep the last value
    pub releases: IndexMap<String, String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub document: HelmfileDocument,
}

impl ManifestSource {
    pub fn new(
        path: impl Into<PathBuf>,
        document: HelmfileDocument,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        let path = path.into();
        let mut releases = IndexMap::new();
        for release in document.entries().iter().filter_map(Release::from_entry) {
            releases.insert(release.chart, release.declared_version);
        }

        Self {
            label: manifest_label(&path),
            path,
            releases,
            last_modified,
            document,
        }
    }

    /// Declared version for a chart, if this manifest pins it
    pub fn declared(&self, chart: &str) -> Option<&str> {
        self.releases.get(chart).map(String::as_str)
    }
}

/// Strip a location scheme so `oci://ghcr.io/org/foo` and `foo` share a key
pub fn normalize_chart(chart: &str) -> String {
    let trimmed = chart.trim();
    for scheme in LOCATION_SCHEMES {
        if let Some(rest) = trimmed.strip_prefix(scheme) {
            let rest = rest.trim_end_matches('/');
            return rest.rsplit('/').next().unwrap_or(rest).to_string();
        }
    }
    trimmed.to_string()
}

/// Label a manifest by the first directory of its relative path
/// (`clusterA/system/helmfile.yaml` -> `clusterA`), falling back to the full path.
pub fn manifest_label(path: &Path) -> String {
    if path.is_relative() {
        let normal: Vec<_> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        if normal.len() > 1 {
            return normal[0].to_string_lossy().into_owned();
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parser::HelmfileParser;
    use rstest::rstest;

    #[rstest]
    #[case("oci://ghcr.io/x/foo", "foo")]
    #[case("oci://registry-1.docker.io/bitnamicharts/nginx/", "nginx")]
    #[case("foo", "foo")]
    #[case("bitnami/nginx", "bitnami/nginx")]
    #[case("  ingress-nginx/ingress-nginx ", "ingress-nginx/ingress-nginx")]
    fn normalize_chart_returns_expected(#[case] chart: &str, #[case] expected: &str) {
        assert_eq!(normalize_chart(chart), expected);
    }

    #[test]
    fn normalize_chart_maps_oci_and_bare_reference_to_same_key() {
        assert_eq!(normalize_chart("oci://ghcr.io/x/foo"), normalize_chart("foo"));
    }

    #[rstest]
    #[case("clusterA/system/helmfile.yaml", "clusterA")]
    #[case("./prod/system/helmfile.yaml", "prod")]
    #[case("helmfile.yaml", "helmfile.yaml")]
    #[case("/srv/prod/helmfile.yaml", "/srv/prod/helmfile.yaml")]
    fn manifest_label_returns_expected(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(manifest_label(Path::new(path)), expected);
    }

    #[test]
    fn manifest_source_skips_entries_without_chart_or_version() {
        let content = r#"releases:
  - name: web
    chart: bitnami/nginx
    version: 15.0.0
  - name: local
    chart: ./charts/local
  - name: orphan
    version: 1.0.0
  - name: blank
    chart: bitnami/redis
    version: ""
"#;
        let document = HelmfileParser.parse(content).unwrap();

        let source = ManifestSource::new("a/system/helmfile.yaml", document, None);

        assert_eq!(source.releases.len(), 1);
        assert_eq!(source.declared("bitnami/nginx"), Some("15.0.0"));
        assert_eq!(source.label, "a");
    }

    #[test]
    fn manifest_source_keeps_last_seen_version_for_duplicate_chart() {
        let content = r#"releases:
  - chart: oci://ghcr.io/org/foo
    version: 1.0.0
  - chart: foo
    version: 2.0.0
"#;
        let document = HelmfileParser.parse(content).unwrap();

        let source = ManifestSource::new("helmfile.yaml", document, None);

        assert_eq!(
            source.releases.into_iter().collect::<Vec<_>>(),
            vec![("foo".to_string(), "2.0.0".to_string())]
        );
    }
}
