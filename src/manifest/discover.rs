//! Default manifest discovery: `*/system/helmfile.yaml` under a root

use std::path::{Path, PathBuf};

/// Path of a cluster's manifest relative to its directory
pub const MANIFEST_LAYOUT: &[&str] = &["system", "helmfile.yaml"];

/// Find every `<dir>/system/helmfile.yaml` directly below `root`, sorted.
///
/// Paths are returned relative to `root` when `root` is `.`, so the first
/// component names the cluster.
pub fn discover_manifests(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let mut relative = PathBuf::from(entry.file_name());
        relative.extend(MANIFEST_LAYOUT);

        let candidate = if root == Path::new(".") {
            relative
        } else {
            root.join(relative)
        };
        if candidate.is_file() {
            found.push(candidate);
        }
    }

    found.sort();
    Ok(found)
}

/// Report mode only accepts YAML files
pub fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "yaml" | "yml"))
}
