//! Single-manifest annotation run

use std::path::Path;

use anyhow::Context;
use chrono::Utc;

use crate::update::update_manifest;
use crate::version::Reconciler;

/// Message printed after a successful run
pub const SUCCESS_MESSAGE: &str = "Helmfile updated successfully.";

/// Annotate `path` in place and return the summary line
pub async fn run(path: &Path, reconciler: &Reconciler) -> anyhow::Result<String> {
    let annotated = update_manifest(path, reconciler, Utc::now())
        .await
        .with_context(|| format!("Failed to update {:?}", path))?;

    let count = annotated.annotated.len();
    let noun = if count == 1 { "release" } else { "releases" };
    Ok(format!("{} {} stale {} annotated.", SUCCESS_MESSAGE, count, noun))
}
