//! Reads a manifest from disk into a [`ManifestSource`]

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::manifest::parser::{HelmfileParser, ParseError};
use crate::manifest::types::ManifestSource;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Malformed manifest {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read and parse one manifest.
///
/// Returns `NotFound` when the path is absent and `Malformed` when the file
/// is not valid key/value YAML.
pub fn parse_manifest(path: &Path) -> Result<ManifestSource, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::InvalidData => ManifestError::Malformed {
            path: path.to_path_buf(),
            source: ParseError::ParseFailed("file is not valid UTF-8".to_string()),
        },
        _ => ManifestError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let last_modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    let document = HelmfileParser
        .parse(&content)
        .map_err(|source| ManifestError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

    let source = ManifestSource::new(path, document, last_modified);
    debug!(
        "Parsed {:?}: {} releases with pinned versions",
        path,
        source.releases.len()
    );

    Ok(source)
}
