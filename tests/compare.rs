//! End-to-end comparison report tests

mod helper;

use std::sync::Arc;

use helper::{StaticSource, create_manifest_tree, create_test_reconciler};
use helmfile_audit::commands::compare::{self, CompareOptions};
use helmfile_audit::report::OutputFormat;

const CLUSTER_A: &str = "\
releases:
  - name: web
    chart: bitnami/nginx
    version: 15.0.0
  - name: cache
    chart: bitnami/redis
    version: 18.1.0
";

const CLUSTER_B: &str = "\
releases:
  - name: web
    chart: bitnami/nginx
    version: 15.1.0
";

#[tokio::test]
async fn report_highlights_drift_across_manifests() {
    let (_temp_dir, paths) = create_manifest_tree(&[
        ("b/system/helmfile.yaml", CLUSTER_B),
        ("a/system/helmfile.yaml", CLUSTER_A),
    ]);
    let source = Arc::new(
        StaticSource::new()
            .with_versions("bitnami/nginx", vec!["15.0.0", "15.1.0", "16.0.0-rc1"])
            .with_versions("bitnami/redis", vec!["18.1.0"]),
    );
    let reconciler = create_test_reconciler(source.clone());
    let options = CompareOptions {
        format: OutputFormat::Html,
        show_age: false,
    };

    let report = compare::run(&paths, &reconciler, &options).await.unwrap();

    assert_eq!(source.calls(), 2);
    assert!(report.contains("<td>bitnami/nginx</td><td>15.1.0</td>"));
    assert!(report.contains(r#"<span style="color:#d73a49;font-weight:bold">15.0.0</span>"#));
    assert!(report.contains("<td>bitnami/redis</td><td>18.1.0</td><td>18.1.0</td><td>-</td>"));
    assert!(!report.contains("16.0.0-rc1"));
}

#[tokio::test]
async fn report_skips_malformed_manifest() {
    let (_temp_dir, paths) = create_manifest_tree(&[
        ("a/system/helmfile.yaml", CLUSTER_A),
        ("broken/system/helmfile.yaml", "releases: [\n  - chart: x\n"),
    ]);
    let source = Arc::new(
        StaticSource::new()
            .with_versions("bitnami/nginx", vec!["15.1.0"])
            .with_versions("bitnami/redis", vec!["18.1.0"]),
    );
    let reconciler = create_test_reconciler(source);

    let report = compare::run(&paths, &reconciler, &CompareOptions::default())
        .await
        .unwrap();

    let header = report.lines().next().unwrap();
    assert!(header.contains("Chart"));
    assert!(header.contains("Latest Version"));
    assert!(!header.contains("broken"));
    assert!(report.contains("bitnami/redis"));
}

#[tokio::test]
async fn report_marks_unknown_latest_with_placeholder() {
    let (_temp_dir, paths) = create_manifest_tree(&[("a/system/helmfile.yaml", CLUSTER_B)]);
    let reconciler = create_test_reconciler(Arc::new(StaticSource::new()));
    let options = CompareOptions {
        format: OutputFormat::Html,
        show_age: true,
    };

    let report = compare::run(&paths, &reconciler, &options).await.unwrap();

    assert!(report.contains("<td>bitnami/nginx</td><td>-</td><td>15.1.0</td>"));
    assert!(report.contains("Last modified"));
}
