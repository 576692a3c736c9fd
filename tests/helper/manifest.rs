//! Manifest fixtures on disk

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Write `content` to `<root>/<relative>`, creating parent directories
pub fn write_manifest(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Temporary directory holding one manifest per `(relative path, content)` pair
pub fn create_manifest_tree(manifests: &[(&str, &str)]) -> (TempDir, Vec<PathBuf>) {
    let temp_dir = TempDir::new().unwrap();
    let paths = manifests
        .iter()
        .map(|(relative, content)| write_manifest(temp_dir.path(), relative, content))
        .collect();
    (temp_dir, paths)
}
