//! Annotation of stale releases
//!
//! Edits are byte-range insertions into the original text: a trailing comment
//! on the version line of each stale release and one scan-timestamp line above
//! `releases:`. Nothing else in the document changes.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::manifest::{ManifestSource, Release};
use crate::version::resolution::Resolution;

/// Prefix of every comment this tool writes; earlier ones are replaced on re-run
pub const ANNOTATION_PREFIX: &str = "# audit:";

const SCAN_PREFIX: &str = "# audit: scanned";

/// Result of annotating one manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedManifest {
    pub content: String,
    /// Charts that received a staleness annotation, in document order
    pub annotated: Vec<String>,
}

#[derive(Debug)]
struct TextEdit {
    range: Range<usize>,
    new_text: String,
}

/// Produce the annotated document for a manifest.
///
/// Releases whose latest version is unknown, or equal to the declared one, are
/// left untouched.
pub fn apply(
    source: &ManifestSource,
    resolutions: &BTreeMap<String, Resolution>,
    scanned_at: DateTime<Utc>,
) -> AnnotatedManifest {
    let document = &source.document;
    let content = document.content();

    // Annotations keyed by the end of the line they go on
    let mut by_line: BTreeMap<usize, (usize, Vec<String>)> = BTreeMap::new();
    let mut annotated = Vec::new();

    for entry in document.entries() {
        let (Some(release), Some(span)) = (Release::from_entry(entry), entry.version_span.clone())
        else {
            continue;
        };
        let Some(resolution) = resolutions.get(&release.chart) else {
            continue;
        };
        let Some(latest) = resolution.latest_version.as_deref() else {
            continue;
        };
        if latest == release.declared_version {
            continue;
        }

        let line_end = line_end(content, span.end);
        let replace_from = content[span.end..line_end]
            .find(ANNOTATION_PREFIX)
            .map(|p| trim_start_whitespace(content, span.end + p, span.end))
            .unwrap_or(line_end);

        let slot = by_line.entry(line_end).or_insert((replace_from, Vec::new()));
        slot.0 = slot.0.min(replace_from);
        slot.1.push(release_annotation(latest, resolution.latest_timestamp));
        annotated.push(release.chart);
    }

    let mut edits: Vec<TextEdit> = by_line
        .into_iter()
        .map(|(line_end, (replace_from, texts))| TextEdit {
            range: replace_from..line_end,
            new_text: format!(" {}", texts.join("; ")),
        })
        .collect();

    edits.push(scan_edit(
        content,
        document.releases_keys().first().copied(),
        scanned_at,
    ));

    debug!(
        "Annotating {:?}: {} stale releases",
        source.path,
        annotated.len()
    );

    AnnotatedManifest {
        content: apply_edits(content, edits),
        annotated,
    }
}

fn release_annotation(latest: &str, released_at: Option<DateTime<Utc>>) -> String {
    match released_at {
        Some(date) => format!(
            "{} latest {} released {}",
            ANNOTATION_PREFIX,
            latest,
            date.format("%Y-%m-%d")
        ),
        None => format!("{} latest {}", ANNOTATION_PREFIX, latest),
    }
}

/// Insert (or replace) the scan line directly above the `releases` key
fn scan_edit(content: &str, releases_key: Option<usize>, scanned_at: DateTime<Utc>) -> TextEdit {
    let anchor = releases_key.unwrap_or(0);
    let line_start = line_start(content, anchor);
    let prefix = &content[line_start..anchor];
    let indent = if prefix.chars().all(char::is_whitespace) {
        prefix
    } else {
        ""
    };
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };

    let new_text = format!(
        "{indent}{SCAN_PREFIX} {}{newline}",
        scanned_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    // A scan line left by an earlier run sits on the line above
    let previous_start = (line_start > 0).then(|| self::line_start(content, line_start - 1));
    let range = match previous_start {
        Some(start) if content[start..line_start].trim_start().starts_with(SCAN_PREFIX) => {
            start..line_start
        }
        _ => line_start..line_start,
    };

    TextEdit { range, new_text }
}

/// Apply non-overlapping edits back to front so earlier offsets stay valid
fn apply_edits(content: &str, mut edits: Vec<TextEdit>) -> String {
    edits.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut out = content.to_string();
    for edit in edits {
        out.replace_range(edit.range, &edit.new_text);
    }
    out
}

fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |p| p + 1)
}

/// End of the line containing `offset`, before any `\r\n` / `\n`
fn line_end(content: &str, offset: usize) -> usize {
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |p| offset + p);
    if end > offset && content.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

/// Move `offset` left over spaces and tabs, but not before `floor`
fn trim_start_whitespace(content: &str, offset: usize, floor: usize) -> usize {
    let trimmed = content[floor..offset].trim_end_matches([' ', '\t']);
    floor + trimmed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::HelmfileParser;
    use crate::version::resolution::DeclaredVersion;
    use crate::version::types::VersionCandidate;

    fn scanned_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn source(content: &str) -> ManifestSource {
        ManifestSource::new("helmfile.yaml", HelmfileParser.parse(content).unwrap(), None)
    }

    fn resolutions(
        source: &ManifestSource,
        latest: &[(&str, VersionCandidate)],
    ) -> BTreeMap<String, Resolution> {
        source
            .releases
            .iter()
            .map(|(chart, declared)| {
                let candidate = latest
                    .iter()
                    .find(|(name, _)| name == chart)
                    .map(|(_, c)| c);
                (
                    chart.clone(),
                    Resolution::new(
                        chart.clone(),
                        DeclaredVersion::Declared(declared.clone()),
                        candidate,
                    ),
                )
            })
            .collect()
    }

    const MANIFEST: &str = r#"# cluster: prod
repositories:
  - name: bitnami
    url: https://charts.bitnami.com/bitnami

helmDefaults:
  wait: true # keep

releases:
  - name: web
    chart: bitnami/nginx
    version: "15.0.0" # pinned for CVE
  - name: cache
    chart: bitnami/redis
    version: 18.0.0
  - name: local
    chart: ./charts/local
"#;

    #[test]
    fn apply_annotates_stale_release_without_touching_version() {
        let source = source(MANIFEST);
        let released = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let resolutions = resolutions(
            &source,
            &[
                (
                    "bitnami/nginx",
                    VersionCandidate::new("15.1.0").with_release_date(released),
                ),
                ("bitnami/redis", VersionCandidate::new("18.0.0")),
            ],
        );

        let result = apply(&source, &resolutions, scanned_at());

        let expected = MANIFEST
            .replace(
                "version: \"15.0.0\" # pinned for CVE",
                "version: \"15.0.0\" # pinned for CVE # audit: latest 15.1.0 released 2023-11-14",
            )
            .replace(
                "\nreleases:",
                "\n# audit: scanned 2026-10-18T09:30:00Z\nreleases:",
            );
        assert_eq!(result.content, expected);
        assert_eq!(result.annotated, vec!["bitnami/nginx"]);
    }

    #[test]
    fn apply_with_nothing_stale_only_adds_scan_line() {
        let source = source(MANIFEST);
        let resolutions = resolutions(
            &source,
            &[
                ("bitnami/nginx", VersionCandidate::new("15.0.0")),
                ("bitnami/redis", VersionCandidate::new("18.0.0")),
            ],
        );

        let result = apply(&source, &resolutions, scanned_at());

        assert!(result.annotated.is_empty());
        assert_eq!(
            result
                .content
                .replace("# audit: scanned 2026-10-18T09:30:00Z\n", ""),
            MANIFEST
        );
    }

    #[test]
    fn apply_leaves_unknown_latest_untouched() {
        let source = source(MANIFEST);
        let resolutions = resolutions(&source, &[]);

        let result = apply(&source, &resolutions, scanned_at());

        assert!(result.annotated.is_empty());
        assert!(!result.content.contains("# audit: latest"));
    }

    #[test]
    fn apply_omits_release_date_when_unknown() {
        let content = "releases:\n  - chart: bitnami/redis\n    version: 18.0.0\n";
        let source = source(content);
        let resolutions = resolutions(&source, &[("bitnami/redis", VersionCandidate::new("18.1.0"))]);

        let result = apply(&source, &resolutions, scanned_at());

        assert_eq!(
            result.content,
            "# audit: scanned 2026-10-18T09:30:00Z\nreleases:\n  - chart: bitnami/redis\n    version: 18.0.0 # audit: latest 18.1.0\n"
        );
    }

    #[test]
    fn apply_replaces_annotations_from_previous_run() {
        let content = "# audit: scanned 2026-01-01T00:00:00Z\nreleases:\n  - chart: bitnami/redis\n    version: 18.0.0   # audit: latest 18.0.5\n";
        let source = source(content);
        let resolutions = resolutions(&source, &[("bitnami/redis", VersionCandidate::new("18.1.0"))]);

        let result = apply(&source, &resolutions, scanned_at());

        assert_eq!(
            result.content,
            "# audit: scanned 2026-10-18T09:30:00Z\nreleases:\n  - chart: bitnami/redis\n    version: 18.0.0 # audit: latest 18.1.0\n"
        );
    }

    #[test]
    fn apply_respects_crlf_and_missing_trailing_newline() {
        let content = "releases:\r\n  - chart: bitnami/redis\r\n    version: 18.0.0";
        let source = source(content);
        let resolutions = resolutions(&source, &[("bitnami/redis", VersionCandidate::new("18.1.0"))]);

        let result = apply(&source, &resolutions, scanned_at());

        assert_eq!(
            result.content,
            "# audit: scanned 2026-10-18T09:30:00Z\r\nreleases:\r\n  - chart: bitnami/redis\r\n    version: 18.0.0 # audit: latest 18.1.0"
        );
    }

    #[test]
    fn apply_annotates_oci_chart_by_normalized_key() {
        let content = "releases:\n  - chart: oci://ghcr.io/org/foo\n    version: 1.0.0\n";
        let source = source(content);
        let resolutions = resolutions(&source, &[("foo", VersionCandidate::new("1.1.0"))]);

        let result = apply(&source, &resolutions, scanned_at());

        assert!(result.content.contains("version: 1.0.0 # audit: latest 1.1.0\n"));
        assert_eq!(result.annotated, vec!["foo"]);
    }

    #[test]
    fn apply_puts_scan_line_at_top_when_there_is_no_releases_key() {
        let content = "repositories: []\n";
        let source = source(content);

        let result = apply(&source, &BTreeMap::new(), scanned_at());

        assert_eq!(
            result.content,
            "# audit: scanned 2026-10-18T09:30:00Z\nrepositories: []\n"
        );
    }
}
