//! Cross-manifest comparison report

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::manifest::{ManifestSource, is_yaml_path, parse_manifest};
use crate::report::{OutputFormat, build_table, render};
use crate::version::Reconciler;

#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub format: OutputFormat,
    pub show_age: bool,
}

/// Load the given manifests, skipping anything unreadable.
///
/// Non-YAML paths, missing files and malformed manifests are logged and left
/// out. The result is sorted by column label.
pub fn load_manifests(paths: &[PathBuf]) -> Vec<ManifestSource> {
    let mut sources: Vec<ManifestSource> = paths
        .iter()
        .filter(|path| {
            let yaml = is_yaml_path(path);
            if !yaml {
                warn!("Skipping non-YAML path {:?}", path);
            }
            yaml
        })
        .filter_map(|path| match parse_manifest(path) {
            Ok(source) => Some(source),
            Err(e) => {
                warn!("Skipping manifest: {}", e);
                None
            }
        })
        .collect();

    sources.sort_by(|a, b| a.label.cmp(&b.label));
    sources
}

/// Produce the rendered comparison report for `paths`
pub async fn run(
    paths: &[PathBuf],
    reconciler: &Reconciler,
    options: &CompareOptions,
) -> anyhow::Result<String> {
    let sources = load_manifests(paths);
    info!(
        "Comparing {} manifests ({} given)",
        sources.len(),
        paths.len()
    );

    let resolutions = reconciler.resolve(&sources).await;
    let age_reference = options.show_age.then(Utc::now);
    let table = build_table(&sources, &resolutions, age_reference);

    Ok(render(&table, options.format))
}
