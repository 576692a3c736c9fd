//! Single-manifest updater
//!
//! Stale releases are annotated rather than rewritten; the operator decides
//! whether to take the upgrade.

pub mod annotate;
pub mod error;
pub mod writer;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

pub use annotate::{ANNOTATION_PREFIX, AnnotatedManifest, apply};
pub use error::UpdateError;
pub use writer::write_atomically;

use crate::manifest::parse_manifest;
use crate::version::engine::Reconciler;

/// Parse, resolve, annotate and write back one manifest.
///
/// Any failure before the final rename leaves the file as it was.
pub async fn update_manifest(
    path: &Path,
    reconciler: &Reconciler,
    scanned_at: DateTime<Utc>,
) -> Result<AnnotatedManifest, UpdateError> {
    let source = parse_manifest(path)?;
    let resolutions = reconciler.resolve_one(&source).await;
    let annotated = apply(&source, &resolutions, scanned_at);

    write_atomically(path, &annotated.content).map_err(|source| UpdateError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Updated {:?}: {} stale releases annotated",
        path,
        annotated.annotated.len()
    );
    Ok(annotated)
}
